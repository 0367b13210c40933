use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bitext_align::{
    AlignerConfig, Alignment, AlignmentError, Cancellation, EnglishTokenizer, Prediction,
    PredictionFuture, Predictor, SharedPredictor, SymmetricAligner, SymmetricAlignerBuilder,
    Token, Tokenizer,
};

/// Answers every call with the predictions stored for its context.
#[derive(Default)]
struct ScriptedPredictor {
    by_context: HashMap<String, Vec<Prediction>>,
    calls: Mutex<Vec<(usize, String)>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPredictor {
    fn answer(mut self, context: &str, predictions: Vec<Prediction>) -> Self {
        self.by_context.insert(context.to_string(), predictions);
        self
    }
}

impl Predictor for ScriptedPredictor {
    fn predict<'a>(&'a self, questions: &'a [String], context: &'a str) -> PredictionFuture<'a> {
        self.calls
            .lock()
            .unwrap()
            .push((questions.len(), context.to_string()));
        self.questions.lock().unwrap().extend(questions.iter().cloned());
        let result = self
            .by_context
            .get(context)
            .cloned()
            .ok_or_else(|| AlignmentError::Runtime {
                context: "scripted predictor",
                message: format!("no script for context {context:?}"),
            });
        Box::pin(async move { result })
    }
}

/// Fixed token lists for known sentences, English rules otherwise.
struct TableTokenizer(HashMap<&'static str, Vec<Token>>);

impl Tokenizer for TableTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.0
            .get(text)
            .cloned()
            .unwrap_or_else(|| EnglishTokenizer.tokenize(text))
    }
}

fn aligner_with(predictor: Arc<ScriptedPredictor>, to_tokenizer: Box<dyn Tokenizer>) -> SymmetricAligner {
    SymmetricAlignerBuilder::new(AlignerConfig::default())
        .with_shared_predictor(SharedPredictor::from_arc(predictor))
        .with_to_tokenizer(to_tokenizer)
        .build()
        .expect("aligner builds")
}

fn p(score: f64, start: i32, end: i32) -> Prediction {
    Prediction::new(score, start, end, "")
}

#[tokio::test]
async fn foo_bar_drops_low_score_duplicate() {
    let predictor = Arc::new(
        ScriptedPredictor::default()
            .answer("ほげ\u{3000}ぴよ", vec![p(1.0, 0, 2), p(1.0, 3, 5)])
            .answer("foo bar", vec![p(1.0, 0, 3), p(0.0, 0, 3)]),
    );
    let aligner = aligner_with(predictor.clone(), Box::new(EnglishTokenizer));

    let out = aligner
        .align_symmetric("foo bar", "ほげ\u{3000}ぴよ")
        .await
        .unwrap();
    assert_eq!(out, [Alignment::new(0, 3, 0, 2), Alignment::new(4, 7, 3, 5)]);

    let calls = predictor.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        [
            (2, "ほげ\u{3000}ぴよ".to_string()),
            (2, "foo bar".to_string())
        ]
    );
    let questions = predictor.questions.lock().unwrap().clone();
    assert_eq!(
        questions,
        [
            " ¶ foo ¶  bar",
            "foo  ¶ bar ¶ ",
            " ¶ ほげ ¶ \u{3000}ぴよ",
            "ほげ\u{3000} ¶ ぴよ ¶ "
        ]
    );
}

#[tokio::test]
async fn looks_good_collapses_to_two_alignments() {
    let predictor = Arc::new(
        ScriptedPredictor::default()
            .answer("いいかもね。", vec![p(0.9, 0, 5), p(0.9, 0, 5)])
            .answer(
                "Looks good.",
                vec![p(0.95, 0, 5), p(0.6, 6, 10), p(0.7, 6, 10), p(0.8, 10, 11)],
            ),
    );
    let mut table = HashMap::new();
    table.insert(
        "いいかもね。",
        vec![
            Token::new(0, 2),
            Token::new(2, 4),
            Token::new(4, 5),
            Token::new(5, 6),
        ],
    );
    let aligner = aligner_with(predictor, Box::new(TableTokenizer(table)));

    let out = aligner
        .align_symmetric("Looks good.", "いいかもね。")
        .await
        .unwrap();
    assert_eq!(out, [Alignment::new(0, 10, 0, 5), Alignment::new(10, 11, 5, 6)]);
}

#[tokio::test]
async fn question_for_the_keeps_doubled_spaces() {
    let from = "I'm the light cruiser, Tama. I'm not a cat-nya.";
    let predictor = Arc::new(
        ScriptedPredictor::default()
            .answer("多摩", vec![p(0.0, 0, 0); 10])
            .answer(from, vec![p(0.9, 23, 27)]),
    );
    let aligner = aligner_with(predictor.clone(), Box::new(EnglishTokenizer));

    let out = aligner.align_symmetric(from, "多摩").await.unwrap();
    assert_eq!(out, [Alignment::new(23, 27, 0, 2)]);

    let questions = predictor.questions.lock().unwrap().clone();
    assert_eq!(questions.len(), 11);
    assert_eq!(
        questions[1],
        "I'm  ¶ the ¶  light cruiser, Tama. I'm not a cat-nya."
    );
}

#[tokio::test]
async fn empty_side_never_calls_predictor() {
    let predictor = Arc::new(ScriptedPredictor::default());
    let aligner = aligner_with(predictor.clone(), Box::new(EnglishTokenizer));

    assert!(aligner.align_symmetric("", "ほげ").await.unwrap().is_empty());
    assert!(aligner.align_symmetric("foo", "").await.unwrap().is_empty());
    assert!(aligner.align_symmetric("...", "。").await.unwrap().is_empty());
    assert!(predictor.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn tokenless_to_text_still_gets_forward_questions() {
    let predictor = Arc::new(
        ScriptedPredictor::default().answer("  \u{3000}", vec![p(0.0, 0, 1), p(0.0, 0, 1)]),
    );
    let aligner = aligner_with(predictor.clone(), Box::new(EnglishTokenizer));

    let out = aligner.align_symmetric("foo bar", "  \u{3000}").await.unwrap();
    assert!(out.is_empty());
    let calls = predictor.calls.lock().unwrap().clone();
    assert_eq!(calls, [(2, "  \u{3000}".to_string())]);
}

#[tokio::test]
async fn predictor_failure_is_propagated() {
    let predictor = Arc::new(ScriptedPredictor::default());
    let aligner = aligner_with(predictor, Box::new(EnglishTokenizer));
    let err = aligner.align_symmetric("foo", "bar").await.unwrap_err();
    assert!(matches!(err, AlignmentError::Runtime { .. }));
}

#[tokio::test]
async fn wrong_prediction_count_is_fatal() {
    let predictor = Arc::new(
        ScriptedPredictor::default()
            .answer("bar", vec![p(1.0, 0, 3), p(1.0, 0, 3)])
            .answer("foo", vec![p(1.0, 0, 3)]),
    );
    let aligner = aligner_with(predictor, Box::new(EnglishTokenizer));
    let err = aligner.align_symmetric("foo", "bar").await.unwrap_err();
    assert!(matches!(err, AlignmentError::Runtime { .. }));
}

#[tokio::test]
async fn identical_inputs_give_identical_results() {
    let predictor = Arc::new(
        ScriptedPredictor::default()
            .answer("ほげ\u{3000}ぴよ", vec![p(0.5, 0, 5), p(0.5, 0, 5)])
            .answer("foo bar", vec![p(0.5, 0, 7), p(0.5, 0, 7)]),
    );
    let aligner = aligner_with(predictor, Box::new(EnglishTokenizer));
    let first = aligner.align_symmetric("foo bar", "ほげ\u{3000}ぴよ").await.unwrap();
    for _ in 0..5 {
        let again = aligner.align_symmetric("foo bar", "ほげ\u{3000}ぴよ").await.unwrap();
        assert_eq!(again, first);
    }
    assert_eq!(first, [Alignment::new(0, 7, 0, 5)]);
}

#[tokio::test]
async fn overlong_text_is_rejected() {
    let predictor = Arc::new(ScriptedPredictor::default());
    let aligner = aligner_with(predictor, Box::new(EnglishTokenizer));
    let long = "a ".repeat(40_000);
    let err = aligner.align_symmetric(&long, "b").await.unwrap_err();
    assert!(matches!(err, AlignmentError::InvalidInput { .. }));
}

/// Tracks how many calls run at once; each call yields to the scheduler mid-way.
struct OverlapCounter {
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl Predictor for OverlapCounter {
    fn predict<'a>(&'a self, questions: &'a [String], _context: &'a str) -> PredictionFuture<'a> {
        Box::pin(async move {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![Prediction::new(1.0, 0, 1, ""); questions.len()])
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_serialize_at_the_predictor() {
    let counter = Arc::new(OverlapCounter {
        active: AtomicUsize::new(0),
        max_active: AtomicUsize::new(0),
    });
    let shared = SharedPredictor::from_arc(counter.clone());
    let aligner = Arc::new(
        SymmetricAlignerBuilder::new(AlignerConfig::default())
            .with_shared_predictor(shared)
            .with_to_tokenizer(Box::new(EnglishTokenizer))
            .build()
            .unwrap(),
    );

    let handles = (0..8)
        .map(|_| {
            let aligner = aligner.clone();
            tokio::spawn(async move { aligner.align_symmetric("foo bar", "baz qux").await })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(counter.max_active.load(Ordering::SeqCst), 1);
}

/// Never answers its first call; answers every later call immediately.
struct HangOnce {
    calls: AtomicUsize,
}

impl Predictor for HangOnce {
    fn predict<'a>(&'a self, questions: &'a [String], _context: &'a str) -> PredictionFuture<'a> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if call == 0 {
                std::future::pending::<()>().await;
            }
            Ok(vec![Prediction::new(1.0, 0, 3, ""); questions.len()])
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancellation_is_all_or_nothing_and_leaves_predictor_usable() {
    let aligner = Arc::new(
        SymmetricAlignerBuilder::new(AlignerConfig::default())
            .with_predictor(HangOnce {
                calls: AtomicUsize::new(0),
            })
            .with_to_tokenizer(Box::new(EnglishTokenizer))
            .build()
            .unwrap(),
    );
    let cancel = Cancellation::new();

    let pending = {
        let aligner = aligner.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            aligner
                .align_symmetric_with_cancel("foo", "bar", &cancel)
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();
    let result = pending.await.unwrap();
    assert!(matches!(result, Err(AlignmentError::Cancelled)));

    let out = aligner.align_symmetric("foo", "bar").await.unwrap();
    assert_eq!(out, [Alignment::new(0, 3, 0, 3)]);
}

#[tokio::test]
async fn already_cancelled_request_does_no_work() {
    let predictor = Arc::new(ScriptedPredictor::default());
    let aligner = aligner_with(predictor.clone(), Box::new(EnglishTokenizer));
    let cancel = Cancellation::new();
    cancel.cancel();
    let err = aligner
        .align_symmetric_with_cancel("foo", "bar", &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert!(predictor.calls.lock().unwrap().is_empty());
}
