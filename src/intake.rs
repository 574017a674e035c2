//! The intake form: collects repository input, validates it, and drives the
//! analyze and generate requests while reporting progress to an observer.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::client::PipelineService;
use crate::errors::IntakeError;
use crate::models::{AnalysisResult, PipelineDocument};
use crate::util::is_blank;

pub const GENERATE_VALIDATION_MESSAGE: &str =
    "Please provide either a repository URL or code content";
pub const ANALYZE_VALIDATION_MESSAGE: &str =
    "Please provide either a repository URL or code content to analyze";
pub const GENERATE_FALLBACK_MESSAGE: &str = "Failed to generate pipeline";
pub const ANALYZE_FALLBACK_MESSAGE: &str = "Failed to analyze repository";

/// The four form fields, sent verbatim (empty string when unset) as the
/// request body of both endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub repository_url: String,
    pub repository_content: String,
    pub language: String,
    pub framework: String,
}

impl FormState {
    /// True when neither a URL nor code content was supplied.
    pub fn lacks_source(&self) -> bool {
        is_blank(&self.repository_url) && is_blank(&self.repository_content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    RepositoryUrl,
    RepositoryContent,
    Language,
    Framework,
}

/// Which submission an error notification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Analyze,
    Generate,
}

/// Receives the form's side effects. Implementations use interior
/// mutability; the form only ever holds a shared reference.
pub trait IntakeObserver: Send + Sync {
    fn loading_changed(&self, loading: bool);

    fn pipeline_received(&self, pipeline: &PipelineDocument);

    /// `None` clears a previously reported error.
    fn error_changed(&self, operation: Operation, message: Option<&str>);
}

/// Turns loading on when created and off when dropped, so every exit path
/// releases it exactly once.
struct LoadingGuard<'a> {
    observer: &'a dyn IntakeObserver,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(observer: &'a dyn IntakeObserver) -> Self {
        observer.loading_changed(true);
        Self { observer }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.observer.loading_changed(false);
    }
}

pub struct IntakeForm<S> {
    state: Mutex<FormState>,
    service: S,
}

impl<S: PipelineService> IntakeForm<S> {
    pub fn new(service: S) -> Self {
        Self::with_state(service, FormState::default())
    }

    pub fn with_state(service: S, state: FormState) -> Self {
        Self {
            state: Mutex::new(state),
            service,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        // FormState has no invariants a panicking writer could break.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the current field values.
    pub fn state(&self) -> FormState {
        self.lock().clone()
    }

    pub fn set_field(&self, field: Field, value: impl Into<String>) {
        let value = value.into();
        let mut state = self.lock();
        match field {
            Field::RepositoryUrl => state.repository_url = value,
            Field::RepositoryContent => state.repository_content = value,
            Field::Language => state.language = value,
            Field::Framework => state.framework = value,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Validate and request a generated pipeline.
    ///
    /// On success the observer receives the pipeline; on any failure it
    /// receives exactly one error message.
    pub async fn submit_generate(
        &self,
        observer: &dyn IntakeObserver,
    ) -> Result<PipelineDocument, IntakeError> {
        let form = self.state();
        if form.lacks_source() {
            return Err(reject(observer, Operation::Generate, GENERATE_VALIDATION_MESSAGE));
        }

        let _loading = LoadingGuard::acquire(observer);
        match self.service.generate_pipeline(&form).await {
            Ok(pipeline) => {
                observer.pipeline_received(&pipeline);
                Ok(pipeline)
            }
            Err(err) => {
                tracing::warn!(error = %err, "generate request failed");
                let message = err.user_message(GENERATE_FALLBACK_MESSAGE);
                observer.error_changed(Operation::Generate, Some(&message));
                Err(IntakeError::Request(message))
            }
        }
    }

    /// Validate and request an analysis. On success only `language` and
    /// `framework` are overwritten and any displayed error is cleared; on
    /// failure the form is left untouched.
    pub async fn submit_analyze(
        &self,
        observer: &dyn IntakeObserver,
    ) -> Result<AnalysisResult, IntakeError> {
        let form = self.state();
        if form.lacks_source() {
            return Err(reject(observer, Operation::Analyze, ANALYZE_VALIDATION_MESSAGE));
        }

        let _loading = LoadingGuard::acquire(observer);
        match self.service.analyze_repository(&form).await {
            Ok(analysis) => {
                {
                    let mut state = self.lock();
                    state.language = analysis.language.clone().unwrap_or_default();
                    state.framework = analysis.framework.clone().unwrap_or_default();
                }
                observer.error_changed(Operation::Analyze, None);
                Ok(analysis)
            }
            Err(err) => {
                tracing::warn!(error = %err, "analyze request failed");
                let message = err.user_message(ANALYZE_FALLBACK_MESSAGE);
                observer.error_changed(Operation::Analyze, Some(&message));
                Err(IntakeError::Request(message))
            }
        }
    }
}

fn reject(observer: &dyn IntakeObserver, operation: Operation, message: &str) -> IntakeError {
    observer.error_changed(operation, Some(message));
    IntakeError::Validation(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClientError;
    use crate::models::Stage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Loading(bool),
        Pipeline(PipelineDocument),
        Error(Operation, Option<String>),
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<Event>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }

        fn loading(&self) -> Vec<bool> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Event::Loading(l) => Some(l),
                    _ => None,
                })
                .collect()
        }

        fn errors(&self) -> Vec<Option<String>> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    Event::Error(_, msg) => Some(msg),
                    _ => None,
                })
                .collect()
        }
    }

    impl IntakeObserver for Recorder {
        fn loading_changed(&self, loading: bool) {
            self.events.lock().unwrap().push(Event::Loading(loading));
        }

        fn pipeline_received(&self, pipeline: &PipelineDocument) {
            self.events.lock().unwrap().push(Event::Pipeline(pipeline.clone()));
        }

        fn error_changed(&self, operation: Operation, message: Option<&str>) {
            self.events
                .lock()
                .unwrap()
                .push(Event::Error(operation, message.map(String::from)));
        }
    }

    type Reply<T> = fn() -> Result<T, ClientError>;

    struct FakeService {
        generate: Reply<PipelineDocument>,
        analyze: Reply<AnalysisResult>,
        calls: AtomicUsize,
        last_form: Mutex<Option<FormState>>,
    }

    impl FakeService {
        fn new(generate: Reply<PipelineDocument>, analyze: Reply<AnalysisResult>) -> Self {
            Self {
                generate,
                analyze,
                calls: AtomicUsize::new(0),
                last_form: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PipelineService for FakeService {
        async fn analyze_repository(&self, form: &FormState) -> Result<AnalysisResult, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_form.lock().unwrap() = Some(form.clone());
            (self.analyze)()
        }

        async fn generate_pipeline(&self, form: &FormState) -> Result<PipelineDocument, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_form.lock().unwrap() = Some(form.clone());
            (self.generate)()
        }
    }

    fn sample_pipeline() -> Result<PipelineDocument, ClientError> {
        Ok(PipelineDocument {
            stages: Some(vec![Stage {
                name: "Unit Tests Backend".into(),
                stage_type: "unit_test_backend".into(),
                description: "Run backend unit tests".into(),
                commands: vec!["pytest".into()],
                tools: vec!["pytest".into()],
                estimated_duration: "5m".into(),
            }]),
            summary: None,
            recommendations: None,
        })
    }

    fn sample_analysis() -> Result<AnalysisResult, ClientError> {
        Ok(AnalysisResult {
            language: Some("Python".into()),
            framework: Some("FastAPI".into()),
            ..Default::default()
        })
    }

    fn not_found() -> Result<AnalysisResult, ClientError> {
        Err(ClientError::Status {
            status: 404,
            detail: Some("Not Found".into()),
        })
    }

    fn server_error() -> Result<PipelineDocument, ClientError> {
        Err(ClientError::Status {
            status: 500,
            detail: None,
        })
    }

    fn url_form() -> FormState {
        FormState {
            repository_url: "https://github.com/user/repo".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_generate_with_empty_form_is_validation_error_without_request() {
        let form = IntakeForm::new(FakeService::new(sample_pipeline, sample_analysis));
        let recorder = Recorder::default();

        let err = form.submit_generate(&recorder).await.unwrap_err();

        assert_eq!(err, IntakeError::Validation(GENERATE_VALIDATION_MESSAGE.into()));
        assert_eq!(form.service().calls(), 0);
        assert!(recorder.loading().is_empty());
        assert_eq!(recorder.errors(), vec![Some(GENERATE_VALIDATION_MESSAGE.to_string())]);
    }

    #[tokio::test]
    async fn test_whitespace_only_fields_count_as_empty() {
        let form = IntakeForm::with_state(
            FakeService::new(sample_pipeline, sample_analysis),
            FormState {
                repository_url: "   ".into(),
                repository_content: "\n\t".into(),
                language: "Rust".into(),
                framework: String::new(),
            },
        );
        let recorder = Recorder::default();

        assert!(matches!(
            form.submit_generate(&recorder).await,
            Err(IntakeError::Validation(_))
        ));
        assert!(matches!(
            form.submit_analyze(&recorder).await,
            Err(IntakeError::Validation(_))
        ));
        assert_eq!(form.service().calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_with_empty_form_reports_exact_message() {
        let form = IntakeForm::new(FakeService::new(sample_pipeline, sample_analysis));
        let recorder = Recorder::default();

        let _ = form.submit_analyze(&recorder).await;

        assert_eq!(
            recorder.events(),
            vec![Event::Error(
                Operation::Analyze,
                Some("Please provide either a repository URL or code content to analyze".into())
            )]
        );
        assert_eq!(form.service().calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_success_notifies_pipeline_and_toggles_loading() {
        let form = IntakeForm::with_state(
            FakeService::new(sample_pipeline, sample_analysis),
            url_form(),
        );
        let recorder = Recorder::default();

        let pipeline = form.submit_generate(&recorder).await.unwrap();

        assert_eq!(pipeline, sample_pipeline().unwrap());
        assert_eq!(
            recorder.events(),
            vec![
                Event::Loading(true),
                Event::Pipeline(sample_pipeline().unwrap()),
                Event::Loading(false),
            ]
        );
        assert!(recorder.errors().is_empty());
        assert_eq!(*form.service().last_form.lock().unwrap(), Some(url_form()));
    }

    #[tokio::test]
    async fn test_generate_failure_without_detail_uses_transport_message() {
        let form = IntakeForm::with_state(
            FakeService::new(server_error, sample_analysis),
            url_form(),
        );
        let recorder = Recorder::default();

        let err = form.submit_generate(&recorder).await.unwrap_err();

        assert_eq!(err.message(), "Request failed with status code 500");
        assert_eq!(recorder.loading(), vec![true, false]);
        assert_eq!(
            recorder.errors(),
            vec![Some("Request failed with status code 500".to_string())]
        );
    }

    #[tokio::test]
    async fn test_analyze_success_overwrites_only_language_and_framework() {
        let form = IntakeForm::with_state(
            FakeService::new(sample_pipeline, sample_analysis),
            FormState {
                repository_url: "https://github.com/user/repo".into(),
                repository_content: "import fastapi".into(),
                language: "guess".into(),
                framework: "guess".into(),
            },
        );
        let recorder = Recorder::default();

        form.submit_analyze(&recorder).await.unwrap();

        let state = form.state();
        assert_eq!(state.repository_url, "https://github.com/user/repo");
        assert_eq!(state.repository_content, "import fastapi");
        assert_eq!(state.language, "Python");
        assert_eq!(state.framework, "FastAPI");
        assert_eq!(
            recorder.events(),
            vec![
                Event::Loading(true),
                Event::Error(Operation::Analyze, None),
                Event::Loading(false),
            ]
        );
    }

    #[tokio::test]
    async fn test_analyze_missing_fields_become_empty() {
        fn partial() -> Result<AnalysisResult, ClientError> {
            Ok(AnalysisResult {
                language: Some("Go".into()),
                ..Default::default()
            })
        }
        let mut initial = url_form();
        initial.framework = "gin".into();
        let form = IntakeForm::with_state(FakeService::new(sample_pipeline, partial), initial);

        form.submit_analyze(&Recorder::default()).await.unwrap();

        assert_eq!(form.state().language, "Go");
        assert_eq!(form.state().framework, "");
    }

    #[tokio::test]
    async fn test_analyze_rejection_surfaces_detail_and_keeps_form() {
        let mut initial = url_form();
        initial.language = "Rust".into();
        let form = IntakeForm::with_state(
            FakeService::new(sample_pipeline, not_found),
            initial.clone(),
        );
        let recorder = Recorder::default();

        let err = form.submit_analyze(&recorder).await.unwrap_err();

        assert_eq!(err, IntakeError::Request("Not Found".into()));
        assert_eq!(recorder.errors(), vec![Some("Not Found".to_string())]);
        assert_eq!(recorder.loading(), vec![true, false]);
        assert_eq!(form.state(), initial);
    }

    #[tokio::test]
    async fn test_field_edits_are_reflected_in_request() {
        let form = IntakeForm::new(FakeService::new(sample_pipeline, sample_analysis));
        form.set_field(Field::RepositoryContent, "def test(): pass");
        form.set_field(Field::Language, "Python");
        form.set_field(Field::Framework, "pytest");

        form.submit_generate(&Recorder::default()).await.unwrap();

        let sent = form.service().last_form.lock().unwrap().clone().unwrap();
        assert_eq!(sent.repository_url, "");
        assert_eq!(sent.repository_content, "def test(): pass");
        assert_eq!(sent.language, "Python");
        assert_eq!(sent.framework, "pytest");
    }

    #[tokio::test]
    async fn test_concurrent_analyze_and_generate_are_independent() {
        let form = IntakeForm::with_state(
            FakeService::new(sample_pipeline, sample_analysis),
            url_form(),
        );
        let recorder = Recorder::default();

        let (analysis, pipeline) = tokio::join!(
            form.submit_analyze(&recorder),
            form.submit_generate(&recorder)
        );

        assert!(analysis.is_ok());
        assert!(pipeline.is_ok());
        assert_eq!(form.service().calls(), 2);
        let loading = recorder.loading();
        assert_eq!(loading.iter().filter(|l| **l).count(), 2);
        assert_eq!(loading.iter().filter(|l| !**l).count(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_reported_before_loading_clears() {
        let form = IntakeForm::with_state(
            FakeService::new(server_error, sample_analysis),
            url_form(),
        );
        let recorder = Recorder::default();

        form.submit_generate(&recorder).await.unwrap_err();

        assert_eq!(
            recorder.events(),
            vec![
                Event::Loading(true),
                Event::Error(
                    Operation::Generate,
                    Some("Request failed with status code 500".to_string())
                ),
                Event::Loading(false),
            ]
        );
    }

    #[test]
    fn test_form_state_serializes_all_fields() {
        let json = serde_json::to_value(url_form()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "repository_url": "https://github.com/user/repo",
                "repository_content": "",
                "language": "",
                "framework": ""
            })
        );
    }
}
