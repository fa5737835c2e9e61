//! End-to-end submission tests with in-process providers.

use std::sync::{Arc, Mutex};

use pooch_pulse_core::db::Database;
use pooch_pulse_core::models::{DogDraft, DEFAULT_DOG_ID};
use pooch_pulse_core::{
    AnalysisClient, AnalysisError, FfiDogDraft, ImageData, Journal, JournalError, PoochPulseCore,
    PoochPulseError,
};
use pooch_pulse_llm::{
    AnalysisProvider, AnalysisRequest, ProviderConfig, ProviderError, ProviderKind,
    ProviderResult, DEGRADED_ANALYSIS, DEGRADED_SCORE, UNKNOWN,
};

const IMAGE_URI: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";

struct CannedProvider {
    reply: ProviderResult<String>,
    requests: Arc<Mutex<Vec<AnalysisRequest>>>,
}

impl CannedProvider {
    fn boxed(reply: ProviderResult<String>) -> (Box<dyn AnalysisProvider>, Arc<Mutex<Vec<AnalysisRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let provider = CannedProvider {
            reply,
            requests: Arc::clone(&requests),
        };
        (Box::new(provider), requests)
    }
}

impl AnalysisProvider for CannedProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::TextPrompt
    }

    fn has_credential(&self) -> bool {
        true
    }

    fn generate(&self, request: &AnalysisRequest) -> ProviderResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

struct CrashingProvider;

impl AnalysisProvider for CrashingProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::TextPrompt
    }

    fn has_credential(&self) -> bool {
        true
    }

    fn generate(&self, _request: &AnalysisRequest) -> ProviderResult<String> {
        panic!("provider crashed")
    }
}

fn client_replying(text: &str) -> AnalysisClient {
    let (provider, _) = CannedProvider::boxed(Ok(text.to_string()));
    AnalysisClient::with_provider(provider)
}

fn image() -> ImageData {
    ImageData::from_data_uri(IMAGE_URI).unwrap()
}

fn journal() -> Journal {
    Journal::open(Database::open_in_memory().unwrap())
}

#[test]
fn test_well_formed_reply_is_prepended() {
    let mut journal = journal();
    let earlier = journal
        .submit(&client_replying(r#"{"score":4}"#), &image())
        .unwrap();

    let client = client_replying(
        r#"{"score":2,"consistency":"坚实","color":"棕色","findings":[],"analysis":"形态理想","recommendation":"保持当前饮食"}"#,
    );
    let report = journal.submit(&client, &image()).unwrap();

    assert_eq!(report.score, 2);
    assert_eq!(report.consistency, "坚实");
    assert_eq!(report.color, "棕色");
    assert!(report.findings.is_empty());
    assert_eq!(report.image_url, IMAGE_URI);
    assert_eq!(report.dog_id, DEFAULT_DOG_ID);

    let reports: Vec<_> = journal.state().reports.iter().collect();
    assert_eq!(reports[0], &report);
    assert_eq!(reports[1], &earlier);
}

#[test]
fn test_prose_around_json_recovers_fields() {
    let mut journal = journal();
    let reply = "好的，这是我的分析（仅供参考）：\n{\"score\": 6, \"consistency\": \"水样\", \"color\": \"黄绿色\", \"findings\": [\"含黏液\", \"未成形\"], \"analysis\": \"疑似肠胃炎 {急性}\", \"recommendation\": \"及时就医\"}\n如有疑问请咨询兽医。";

    let report = journal.submit(&client_replying(reply), &image()).unwrap();
    assert_eq!(report.score, 6);
    assert_eq!(report.consistency, "水样");
    assert_eq!(report.findings, vec!["含黏液".to_string(), "未成形".to_string()]);
    assert_eq!(report.analysis, "疑似肠胃炎 {急性}");
}

#[test]
fn test_missing_fields_take_defaults() {
    let mut journal = journal();
    let report = journal
        .submit(&client_replying(r#"{"consistency":"成形"}"#), &image())
        .unwrap();

    assert_eq!(report.score, 0);
    assert_eq!(report.color, UNKNOWN);
    assert!(report.findings.is_empty());
    assert!(!report.analysis.is_empty());
    assert!(!report.recommendation.is_empty());
}

#[test]
fn test_unparseable_reply_degrades() {
    let mut journal = journal();
    let report = journal
        .submit(&client_replying("I'm unable to assess this image."), &image())
        .unwrap();

    assert_eq!(report.score, DEGRADED_SCORE);
    assert_eq!(report.consistency, UNKNOWN);
    assert_eq!(report.analysis, DEGRADED_ANALYSIS);
    assert_eq!(journal.state().reports.len(), 1);
}

#[test]
fn test_provider_failures_record_nothing() {
    let mut journal = journal();

    let (provider, _) = CannedProvider::boxed(Err(ProviderError::Unauthorized(
        "Requested entity was not found.".into(),
    )));
    let err = journal
        .submit(&AnalysisClient::with_provider(provider), &image())
        .unwrap_err();
    assert!(matches!(
        err,
        JournalError::Analysis(AnalysisError::InvalidCredential(_))
    ));

    let (provider, _) = CannedProvider::boxed(Err(ProviderError::Transport("timed out".into())));
    let err = journal
        .submit(&AnalysisClient::with_provider(provider), &image())
        .unwrap_err();
    assert!(matches!(err, JournalError::Analysis(AnalysisError::Provider(_))));

    assert!(journal.state().reports.is_empty());
}

#[test]
fn test_reports_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.db");

    let report = {
        let mut journal = Journal::open(Database::open(&path).unwrap());
        let dog = journal.add_dog(DogDraft::named("豆豆")).unwrap();
        journal.set_proxy_url(Some("https://proxy.local")).unwrap();
        let report = journal
            .submit(&client_replying(r#"{"score":3}"#), &image())
            .unwrap();
        assert_eq!(report.dog_id, dog.id);
        report
    };

    let journal = Journal::open(Database::open(&path).unwrap());
    assert_eq!(journal.state().reports.first(), Some(&report));
    assert_eq!(journal.active_dog().name, "豆豆");
    assert_eq!(journal.proxy_url(), Some("https://proxy.local"));
    assert_eq!(journal.active_reports().len(), 1);
}

#[test]
fn test_core_object_flow() {
    let (provider, requests) = CannedProvider::boxed(Ok(
        r#"{"score":2,"consistency":"坚实","color":"棕色","findings":[],"analysis":"好","recommendation":"继续"}"#
            .to_string(),
    ));
    let core = PoochPulseCore::with_client(
        journal(),
        ProviderConfig::new(ProviderKind::TextPrompt),
        AnalysisClient::with_provider(provider),
    );

    assert!(core.has_api_key().unwrap());
    core.set_proxy_url(Some("https://proxy.local/".into())).unwrap();
    assert_eq!(core.analysis_status().unwrap(), "IDLE");

    let report = core.analyze_image(IMAGE_URI.into()).unwrap();
    assert_eq!(report.score, 2);
    assert_eq!(core.analysis_status().unwrap(), "SUCCESS");
    assert_eq!(
        requests.lock().unwrap()[0].proxy_url.as_deref(),
        Some("https://proxy.local/")
    );

    let listed = core.list_reports().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, report.id);

    let summary = core.daily_summary(report.id.clone()).unwrap().unwrap();
    assert!(summary.healthy);
    assert_eq!(summary.dog_name, "旺财");

    let detail = core.report_detail(report.id.clone()).unwrap().unwrap();
    assert_eq!(detail.badge, "green");

    // A new dog starts with an empty history
    let dog = core
        .add_dog(FfiDogDraft {
            name: "豆豆".into(),
            breed: None,
            birth_date: None,
            weight: Some("9".into()),
            custom_avatar_url: None,
        })
        .unwrap();
    assert_eq!(core.active_dog().unwrap().id, dog.id);
    assert!(core.list_reports().unwrap().is_empty());
    assert_eq!(core.trend().unwrap().points.len(), 0);

    core.select_dog(DEFAULT_DOG_ID.into()).unwrap();
    assert_eq!(core.trend().unwrap().points.len(), 1);

    assert!(core.delete_report(report.id.clone()).unwrap());
    assert!(core.get_report(report.id).unwrap().is_none());
    assert_eq!(core.knowledge_items().len(), 4);
}

#[test]
fn test_core_rejects_bad_input() {
    let (provider, _) = CannedProvider::boxed(Ok("{}".into()));
    let core = PoochPulseCore::with_client(
        journal(),
        ProviderConfig::default(),
        AnalysisClient::with_provider(provider),
    );

    assert!(matches!(
        core.analyze_image("not a data uri".into()),
        Err(PoochPulseError::InvalidInput(_))
    ));
    assert_eq!(core.analysis_status().unwrap(), "IDLE");
    assert!(matches!(
        core.select_dog("ghost".into()),
        Err(PoochPulseError::NotFound(_))
    ));
    assert!(matches!(
        core.month_view(2025, 13),
        Err(PoochPulseError::InvalidInput(_))
    ));
    assert!(matches!(
        core.reports_on_date("14/03/2025".into()),
        Err(PoochPulseError::InvalidInput(_))
    ));
}

#[test]
fn test_missing_key_routes_to_setup() {
    let core = pooch_pulse_core::open_journal_in_memory(pooch_pulse_core::FfiProviderConfig {
        kind: "structured".into(),
        api_key: Some("undefined".into()),
        model: None,
        timeout_secs: Some(5),
    })
    .unwrap();

    assert!(!core.has_api_key().unwrap());
    assert!(matches!(
        core.analyze_image(IMAGE_URI.into()),
        Err(PoochPulseError::ApiKeyMissing(_))
    ));
    assert_eq!(core.analysis_status().unwrap(), "ERROR");
    assert!(core.list_reports().unwrap().is_empty());

    core.set_api_key("sk-test".into()).unwrap();
    assert!(core.has_api_key().unwrap());
}

#[test]
fn test_core_rejects_unknown_provider_kind() {
    let result = pooch_pulse_core::open_journal_in_memory(pooch_pulse_core::FfiProviderConfig {
        kind: "llama".into(),
        api_key: None,
        model: None,
        timeout_secs: None,
    });
    assert!(matches!(result, Err(PoochPulseError::InvalidInput(_))));
}

#[test]
fn test_provider_panic_does_not_wedge_status() {
    let core = PoochPulseCore::with_client(
        journal(),
        ProviderConfig::default(),
        AnalysisClient::with_provider(Box::new(CrashingProvider)),
    );

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        core.analyze_image(IMAGE_URI.into())
    }));
    assert!(outcome.is_err());
    assert_eq!(core.analysis_status().unwrap(), "ERROR");
    assert!(core.list_reports().unwrap().is_empty());
}
