use clap::ValueEnum;
use image::{ImageFormat, ImageReader};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::io::Cursor;
use std::path::Path;

use crate::detection_gateway::{DetectionGateway, GatewayError, RawPrediction};
use crate::nutrition::{
    aggregate, remaining_calories, suggest_foods, Detection, NutritionTable, SuggestionItem,
    DAILY_CALORIE_TARGET, DEFAULT_SUGGESTIONS,
};
use crate::report::MealReport;

/// Upload formats accepted for meal photos.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[ImageFormat::Jpeg, ImageFormat::Png];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
        }
    }
}

/// Details collected once per session. Kept for display only; they play no
/// part in the calorie arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gender: Gender,
    pub health_conditions: String,
}

#[derive(Debug)]
pub enum SessionError {
    NotRegistered,
    InvalidImage(String),
    Gateway(GatewayError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotRegistered => {
                write!(f, "Please register (or log in) before uploading a meal photo.")
            }
            SessionError::InvalidImage(reason) => {
                write!(f, "The uploaded file is not a valid image: {}", reason)
            }
            SessionError::Gateway(err) => write!(f, "Food detection failed: {}", err),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SessionError::Gateway(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GatewayError> for SessionError {
    fn from(err: GatewayError) -> Self {
        SessionError::Gateway(err)
    }
}

/// Checks that `data` decodes as a JPEG or PNG image.
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, SessionError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| SessionError::InvalidImage(format!("failed to read image: {}", e)))?;

    let format = reader
        .format()
        .ok_or_else(|| SessionError::InvalidImage("could not detect image format".to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(SessionError::InvalidImage(format!(
            "unsupported image format {:?}, expected JPEG or PNG",
            format
        )));
    }

    reader
        .decode()
        .map_err(|e| SessionError::InvalidImage(format!("failed to decode image: {}", e)))?;

    Ok(format)
}

/// Per-run state: who is registered and which tables to use.
#[derive(Debug, Clone)]
pub struct Session {
    registration: Option<Registration>,
    registered: bool,
    table: NutritionTable,
    suggestions: Vec<SuggestionItem>,
    daily_target: f64,
}

impl Session {
    pub fn new(table: NutritionTable) -> Self {
        Self {
            registration: None,
            registered: false,
            table,
            suggestions: DEFAULT_SUGGESTIONS.to_vec(),
            daily_target: DAILY_CALORIE_TARGET,
        }
    }

    /// Stores the details and returns the welcome message.
    pub fn register(&mut self, registration: Registration) -> String {
        let message = format!("Registration complete! Welcome, {}.", registration.name);
        tracing::info!(name = %registration.name, "user registered");
        self.registration = Some(registration);
        self.registered = true;
        message
    }

    /// Marks an already-registered user as logged in without new details.
    pub fn login(&mut self) {
        self.registered = true;
    }

    pub fn registration(&self) -> Option<&Registration> {
        self.registration.as_ref()
    }

    /// Runs one upload through validation, detection, aggregation and
    /// suggestion. Invalid images never reach the gateway; valid ones are
    /// sent exactly as read.
    pub async fn process_upload<G>(
        &self,
        gateway: &G,
        image_path: &Path,
    ) -> Result<MealReport, SessionError>
    where
        G: DetectionGateway + ?Sized,
    {
        if !self.registered {
            return Err(SessionError::NotRegistered);
        }

        let data = tokio::fs::read(image_path).await.map_err(|e| {
            SessionError::InvalidImage(format!("failed to read {:?}: {}", image_path, e))
        })?;
        let format = validate_image(&data)?;
        tracing::info!(path = ?image_path, ?format, "detecting calories");

        let predictions = gateway.detect(&data).await?;
        let detections: Vec<Detection> = predictions
            .into_iter()
            .map(RawPrediction::into_detection)
            .collect();

        let breakdown = aggregate(&detections, &self.table);
        let remaining = remaining_calories(self.daily_target, &breakdown.totals);
        let suggestions = suggest_foods(remaining, &self.suggestions);

        Ok(MealReport {
            image: image_path.display().to_string(),
            user: self.registration.clone(),
            breakdown,
            daily_target: self.daily_target,
            remaining_calories: remaining,
            suggestions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{ImageBuffer, Rgb};
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    struct StubGateway {
        predictions: Vec<RawPrediction>,
        fail_with_status: Option<reqwest::StatusCode>,
        calls: AtomicUsize,
        received: Mutex<Vec<u8>>,
    }

    impl StubGateway {
        fn returning(predictions: Vec<RawPrediction>) -> Self {
            Self {
                predictions,
                fail_with_status: None,
                calls: AtomicUsize::new(0),
                received: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: reqwest::StatusCode) -> Self {
            Self {
                predictions: Vec::new(),
                fail_with_status: Some(status),
                calls: AtomicUsize::new(0),
                received: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DetectionGateway for StubGateway {
        async fn detect(&self, image_bytes: &[u8]) -> Result<Vec<RawPrediction>, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.received.lock().unwrap() = image_bytes.to_vec();
            match self.fail_with_status {
                Some(status) => Err(GatewayError::ApiError {
                    status,
                    error_body: "stubbed failure".to_string(),
                }),
                None => Ok(self.predictions.clone()),
            }
        }
    }

    fn png_file() -> NamedTempFile {
        let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(4, 4, Rgb([200, 120, 40]));
        img.save_with_format(file.path(), ImageFormat::Png).unwrap();
        file
    }

    fn registered_session() -> Session {
        let mut session = Session::new(NutritionTable::builtin());
        session.register(Registration {
            name: "Asha".to_string(),
            age: 29,
            height_cm: 162.0,
            weight_kg: 58.5,
            gender: Gender::Female,
            health_conditions: String::new(),
        });
        session
    }

    fn prediction(class: &str, confidence: f64, tags: Option<i64>) -> RawPrediction {
        RawPrediction {
            class: Some(class.to_string()),
            confidence: Some(confidence),
            tags,
        }
    }

    #[test]
    fn test_validate_image_accepts_png() {
        let file = png_file();
        let data = std::fs::read(file.path()).unwrap();
        assert_eq!(validate_image(&data).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_validate_image_rejects_text() {
        let result = validate_image(b"definitely not an image");
        assert!(matches!(result, Err(SessionError::InvalidImage(_))));
    }

    #[test]
    fn test_validate_image_rejects_other_formats() {
        let gif_header = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";
        let result = validate_image(gif_header);
        assert!(matches!(result, Err(SessionError::InvalidImage(_))));
    }

    #[test]
    fn test_validate_image_rejects_truncated_png() {
        let file = png_file();
        let data = std::fs::read(file.path()).unwrap();
        let result = validate_image(&data[..data.len() / 2]);
        assert!(matches!(result, Err(SessionError::InvalidImage(_))));
    }

    #[test]
    fn test_register_stores_details() {
        let mut session = Session::new(NutritionTable::builtin());
        assert!(session.registration().is_none());

        let welcome = session.register(Registration {
            name: "Ravi".to_string(),
            ..Default::default()
        });
        assert_eq!(welcome, "Registration complete! Welcome, Ravi.");
        assert_eq!(session.registration().map(|r| r.name.as_str()), Some("Ravi"));
    }

    #[tokio::test]
    async fn test_login_allows_upload_without_details() {
        let mut session = Session::new(NutritionTable::builtin());
        session.login();
        assert!(session.registration().is_none());

        let gateway = StubGateway::returning(vec![prediction("dal", 0.7, None)]);
        let file = png_file();
        let report = session.process_upload(&gateway, file.path()).await.unwrap();

        assert!(report.user.is_none());
        assert_eq!(report.breakdown.totals.total_calories, 593.0);
    }

    #[tokio::test]
    async fn test_gateway_receives_validated_bytes() {
        let session = registered_session();
        let gateway = StubGateway::returning(Vec::new());
        let file = png_file();
        let on_disk = std::fs::read(file.path()).unwrap();

        session.process_upload(&gateway, file.path()).await.unwrap();

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*gateway.received.lock().unwrap(), on_disk);
    }

    #[tokio::test]
    async fn test_process_upload_end_to_end() {
        let session = registered_session();
        let gateway = StubGateway::returning(vec![
            prediction("rice", 0.9, Some(2)),
            RawPrediction {
                class: None,
                confidence: Some(0.5),
                tags: None,
            },
        ]);
        let file = png_file();

        let report = session.process_upload(&gateway, file.path()).await.unwrap();

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.user.as_ref().map(|u| u.name.as_str()), Some("Asha"));
        let summaries = &report.breakdown.summaries;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].calories, 540.0);
        assert_eq!(summaries[0].confidence_display(), "90.00");
        assert_eq!(summaries[1].label, "Unknown");
        assert_eq!(summaries[1].tag_count, 1);
        assert_eq!(summaries[1].calories, 0.0);
        assert_eq!(report.breakdown.totals.total_calories, 540.0);
        assert_eq!(report.remaining_calories, 1460.0);
        // The default list sums to 1421, below 1460, so every item is suggested.
        assert_eq!(report.suggestions.len(), DEFAULT_SUGGESTIONS.len());
    }

    #[tokio::test]
    async fn test_process_upload_over_budget_has_no_suggestions() {
        let session = registered_session();
        let gateway = StubGateway::returning(vec![
            prediction("ShahiPaneer", 0.8, Some(2)),
            prediction("poha", 0.7, None),
        ]);
        let file = png_file();

        let report = session.process_upload(&gateway, file.path()).await.unwrap();

        assert_eq!(report.breakdown.totals.total_calories, 2655.0);
        assert_eq!(report.remaining_calories, -655.0);
        assert!(report.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_process_upload_requires_registration() {
        let session = Session::new(NutritionTable::builtin());
        let gateway = StubGateway::returning(Vec::new());
        let file = png_file();

        let result = session.process_upload(&gateway, file.path()).await;
        assert!(matches!(result, Err(SessionError::NotRegistered)));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_image_skips_detection() {
        let session = registered_session();
        let gateway = StubGateway::returning(vec![prediction("rice", 0.9, None)]);
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is a grocery list, not a photo").unwrap();

        let result = session.process_upload(&gateway, file.path()).await;
        assert!(matches!(result, Err(SessionError::InvalidImage(_))));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_file_is_invalid_image() {
        let session = registered_session();
        let gateway = StubGateway::returning(Vec::new());

        let result = session
            .process_upload(&gateway, Path::new("no/such/meal.jpg"))
            .await;
        assert!(matches!(result, Err(SessionError::InvalidImage(_))));
    }

    #[tokio::test]
    async fn test_gateway_failure_is_reported() {
        let session = registered_session();
        let gateway = StubGateway::failing(reqwest::StatusCode::SERVICE_UNAVAILABLE);
        let file = png_file();

        let err = session.process_upload(&gateway, file.path()).await.unwrap_err();
        assert!(matches!(err, SessionError::Gateway(GatewayError::ApiError { .. })));
        assert!(err.to_string().starts_with("Food detection failed"));
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn test_empty_detection_result() {
        let session = registered_session();
        let gateway = StubGateway::returning(Vec::new());
        let file = png_file();

        let report = session.process_upload(&gateway, file.path()).await.unwrap();
        assert!(report.breakdown.summaries.is_empty());
        assert_eq!(report.remaining_calories, 2000.0);
    }
}
