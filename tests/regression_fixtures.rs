use std::path::PathBuf;

use bitext_align::{
    decode_alignments, encode_alignments, load_fixture_cases, replay_case, simplify,
    AlignerConfig, EnglishTokenizer, FixtureCase,
};
use bitext_align::alignment::text::Utf16Text;
use libtest_mimic::{Arguments, Failed, Trial};

const SUITE_NAME: &str = "recorded_predictions_reproduce_expected_alignments";

fn main() {
    let args = Arguments::from_args();
    let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-data/alignment_fixtures.json");

    let cases = match load_fixture_cases(&fixtures) {
        Ok(cases) => cases,
        Err(err) => {
            let message = format!("failed to load {}: {err}", fixtures.display());
            let trial = Trial::test(format!("{SUITE_NAME}::setup"), move || Err(message.into()));
            libtest_mimic::run(&args, vec![trial]).exit();
        }
    };

    let mut tests = Vec::with_capacity(cases.len() * 2);
    for case in cases {
        let replay_case_data = case.clone();
        tests.push(Trial::test(
            format!("{SUITE_NAME}::replay::{}", case.id),
            move || check_replay(&replay_case_data),
        ));
        tests.push(Trial::test(
            format!("{SUITE_NAME}::stable::{}", case.id),
            move || check_expected_is_stable(&case),
        ));
    }
    libtest_mimic::run(&args, tests).exit();
}

fn check_replay(case: &FixtureCase) -> Result<(), Failed> {
    let actual = replay_case(
        case,
        &EnglishTokenizer,
        &EnglishTokenizer,
        AlignerConfig::DEFAULT_MIN_CONFIDENCE,
    )
    .map_err(|err| Failed::from(err.to_string()))?;
    if actual != case.expected {
        return Err(format!("expected {:?}\n  actual {:?}", case.expected, actual).into());
    }
    Ok(())
}

/// The stored result is already a fixpoint and survives the blob encoding.
fn check_expected_is_stable(case: &FixtureCase) -> Result<(), Failed> {
    let from = Utf16Text::new(&case.from).map_err(|err| Failed::from(err.to_string()))?;
    let to = Utf16Text::new(&case.to).map_err(|err| Failed::from(err.to_string()))?;
    let again = simplify(case.expected.clone(), &from, &to);
    if again != case.expected {
        return Err(format!("expected set is not a fixpoint: {again:?}").into());
    }
    let decoded = decode_alignments(&encode_alignments(&case.expected))
        .map_err(|err| Failed::from(err.to_string()))?;
    if decoded != case.expected {
        return Err(format!("blob round trip changed the set: {decoded:?}").into());
    }
    Ok(())
}
