//! Processing cycle: build request → ask the model → normalise → export.
//!
//! A cycle either writes the workbook or writes nothing. Every failure is
//! logged here and returned as a [`CycleError`]; the session's busy flag is
//! cleared on every exit path so the next cycle can start.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use loteria_ai::{GeminiError, ImageFile, RequestError, VisionModel, build_request};
use loteria_core::{ExportTable, GameProfile, NormalizeError, normalize};
use loteria_export::ExportError;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum CycleError {
    #[error("a processing cycle is already running")]
    Busy,
    #[error(transparent)]
    FileRead(#[from] RequestError),
    #[error("model request failed: {0}")]
    Model(#[from] GeminiError),
    #[error(transparent)]
    MalformedResponse(#[from] NormalizeError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

/// Where the cycle writes its output.
#[derive(Debug, Clone)]
pub struct CycleOptions {
    pub output: PathBuf,
    /// Also keep the model's raw reply here.
    pub raw_out: Option<PathBuf>,
}

/// Outcome of a successful cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub games: usize,
    pub max_len: usize,
    /// Games whose length differs from the profile's numbers per game.
    pub irregular: usize,
    pub output: PathBuf,
}

/// Session state shared by every cycle: only the busy flag.
#[derive(Debug, Default)]
pub struct Session {
    busy: AtomicBool,
}

/// Clears the session's busy flag when dropped.
pub struct BusyGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark the session busy, or fail if a cycle is already running.
    pub fn begin(&self) -> Result<BusyGuard<'_>, CycleError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CycleError::Busy)?;
        Ok(BusyGuard { busy: &self.busy })
    }

    /// Run one full cycle over `images` with `profile`.
    pub async fn process(
        &self,
        model: &dyn VisionModel,
        profile: &GameProfile,
        images: &[ImageFile],
        options: &CycleOptions,
    ) -> Result<CycleReport, CycleError> {
        let _guard = self.begin()?;
        let result = run(model, profile, images, options).await;
        if let Err(e) = &result {
            error!(error = %e, profile = profile.name, images = images.len(), "processing cycle failed");
        }
        result
    }

    /// Normalise and export a previously saved raw reply, without calling the model.
    pub async fn export_reply(
        &self,
        raw: &str,
        profile: Option<&GameProfile>,
        output: &Path,
    ) -> Result<CycleReport, CycleError> {
        let _guard = self.begin()?;
        let result = finish(raw, profile, output).await;
        if let Err(e) = &result {
            error!(error = %e, "export of saved reply failed");
        }
        result
    }
}

async fn run(
    model: &dyn VisionModel,
    profile: &GameProfile,
    images: &[ImageFile],
    options: &CycleOptions,
) -> Result<CycleReport, CycleError> {
    let request = build_request(profile, images.len(), images).await?;
    let reply = model.generate(&request).await?;

    if let Some(path) = &options.raw_out {
        loteria_export::save(path, reply.text.as_bytes()).await?;
    }

    finish(&reply.text, Some(profile), &options.output).await
}

async fn finish(
    raw: &str,
    profile: Option<&GameProfile>,
    output: &Path,
) -> Result<CycleReport, CycleError> {
    let result = normalize(raw)?;

    let irregular = match profile {
        Some(p) => {
            let irregular: Vec<&str> = result
                .irregular(p.numbers_per_game)
                .map(|e| e.id.as_str())
                .collect();
            if !irregular.is_empty() {
                warn!(
                    expected = p.numbers_per_game,
                    games = ?irregular,
                    "some games do not have the expected count of numbers"
                );
            }
            irregular.len()
        }
        None => 0,
    };

    let table = ExportTable::from_result(&result);
    let bytes = loteria_export::encode(&table)?;
    loteria_export::save(output, &bytes).await?;

    info!(games = result.len(), output = %output.display(), "export complete");
    Ok(CycleReport {
        games: result.len(),
        max_len: table.max_len(),
        irregular,
        output: output.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use loteria_ai::{ModelReply, ModelRequest};
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    /// Canned model: replies with `reply`, or fails with no candidates when `None`.
    struct FakeModel {
        reply: Option<String>,
        calls: AtomicUsize,
        seen_parts: Mutex<Vec<String>>,
    }

    impl FakeModel {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                calls: AtomicUsize::new(0),
                seen_parts: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
                seen_parts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl VisionModel for FakeModel {
        async fn generate(&self, request: &ModelRequest) -> Result<ModelReply, GeminiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_parts.lock().unwrap() =
                request.parts.iter().map(|p| p.data.clone()).collect();
            match &self.reply {
                Some(text) => Ok(ModelReply {
                    text: text.clone(),
                    usage: None,
                }),
                None => Err(GeminiError::NoCandidates),
            }
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        images: Vec<ImageFile>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let images = ["one.jpg", "two.jpg"]
                .iter()
                .map(|name| {
                    let path = dir.path().join(name);
                    std::fs::write(&path, name.as_bytes()).unwrap();
                    ImageFile::new(path, name.len() as u64, "image/jpeg")
                })
                .collect();
            Self { dir, images }
        }

        fn options(&self) -> CycleOptions {
            CycleOptions {
                output: self.dir.path().join("loteria.xlsx"),
                raw_out: None,
            }
        }
    }

    fn megasena() -> &'static GameProfile {
        GameProfile::find("MegaSena").unwrap()
    }

    #[test]
    fn busy_flag_blocks_second_cycle() {
        let session = Session::new();
        let guard = session.begin().unwrap();
        assert!(session.is_busy());
        assert!(matches!(session.begin(), Err(CycleError::Busy)));

        drop(guard);
        assert!(!session.is_busy());
        assert!(session.begin().is_ok());
    }

    #[tokio::test]
    async fn successful_cycle_writes_workbook() {
        let fixture = Fixture::new();
        let model = FakeModel::replying(
            "```json\n{\"game1\":[1,2,3,4,5,6],\"game2\":[7,8,9,10,11,12],\"game3\":[1,2]}\n```",
        );
        let session = Session::new();

        let report = session
            .process(&model, megasena(), &fixture.images, &fixture.options())
            .await
            .unwrap();

        assert_eq!(report.games, 3);
        assert_eq!(report.max_len, 6);
        assert_eq!(report.irregular, 1);
        let bytes = std::fs::read(&report.output).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn images_reach_the_model_in_order() {
        let fixture = Fixture::new();
        let model = FakeModel::replying("{}");

        Session::new()
            .process(&model, megasena(), &fixture.images, &fixture.options())
            .await
            .unwrap();

        let seen = model.seen_parts.lock().unwrap().clone();
        assert_eq!(seen, ["b25lLmpwZw==", "dHdvLmpwZw=="]);
    }

    #[tokio::test]
    async fn malformed_reply_saves_nothing() {
        let fixture = Fixture::new();
        let model = FakeModel::replying("Desculpe, não consegui ler os bilhetes.");
        let session = Session::new();
        let options = fixture.options();

        let err = session
            .process(&model, megasena(), &fixture.images, &options)
            .await
            .unwrap_err();

        assert!(matches!(err, CycleError::MalformedResponse(_)));
        assert!(!options.output.exists());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn model_failure_aborts_cycle() {
        let fixture = Fixture::new();
        let model = FakeModel::failing();
        let options = fixture.options();

        let err = Session::new()
            .process(&model, megasena(), &fixture.images, &options)
            .await
            .unwrap_err();

        assert!(matches!(err, CycleError::Model(GeminiError::NoCandidates)));
        assert!(!options.output.exists());
    }

    #[tokio::test]
    async fn unreadable_image_never_calls_model() {
        let mut fixture = Fixture::new();
        fixture.images.push(ImageFile::new(
            fixture.dir.path().join("vanished.png"),
            10,
            "image/png",
        ));
        let model = FakeModel::replying("{}");
        let session = Session::new();

        let err = session
            .process(&model, megasena(), &fixture.images, &fixture.options())
            .await
            .unwrap_err();

        assert!(matches!(err, CycleError::FileRead(_)));
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn export_failure_leaves_session_ready() {
        let fixture = Fixture::new();
        let model = FakeModel::replying("{\"game1\": [1]}");
        let session = Session::new();
        let options = CycleOptions {
            output: fixture.dir.path().join("missing-dir").join("loteria.xlsx"),
            raw_out: None,
        };

        let err = session
            .process(&model, megasena(), &fixture.images, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, CycleError::Export(_)));

        let report = session
            .process(&model, megasena(), &fixture.images, &fixture.options())
            .await
            .unwrap();
        assert_eq!(report.games, 1);
    }

    #[tokio::test]
    async fn raw_reply_is_kept_when_requested() {
        let fixture = Fixture::new();
        let raw = "```json\n{\"game1\":[1,2,3,4,5,6]}\n```";
        let model = FakeModel::replying(raw);
        let options = CycleOptions {
            raw_out: Some(fixture.dir.path().join("reply.txt")),
            ..fixture.options()
        };

        Session::new()
            .process(&model, megasena(), &fixture.images, &options)
            .await
            .unwrap();

        let kept = std::fs::read_to_string(fixture.dir.path().join("reply.txt")).unwrap();
        assert_eq!(kept, raw);
    }

    #[tokio::test]
    async fn saved_reply_can_be_exported_offline() {
        let fixture = Fixture::new();
        let output = fixture.dir.path().join("offline.xlsx");

        let report = Session::new()
            .export_reply("{\"game1\":[1,2,3], \"game2\":[4,5]}", None, &output)
            .await
            .unwrap();

        assert_eq!(report.games, 2);
        assert_eq!(report.max_len, 3);
        assert_eq!(report.irregular, 0);
        assert!(output.exists());
    }
}
