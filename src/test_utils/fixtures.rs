use std::path::PathBuf;

use tempfile::TempDir;

use crate::core::rubric::Rubric;
use crate::core::scoring::Selection;
use crate::guidance::GuidanceTable;
use crate::utils::fs::DocumentFormat;

/// Four-question rubric; every question offers weights 10/5/2/0 mapped to
/// advanced/intermediate/basic/wrong.
pub const SAMPLE_RUBRIC_JSON: &str = r#"{
  "title": "App Permissions Awareness",
  "questions": [
    {
      "questionId": "Q1",
      "question": "An app asks for location access while you install it. What do you do?",
      "options": [
        {"text": "Grant 'While Using App' only if the feature needs it", "marks": 10, "level": "Advanced"},
        {"text": "Grant it but review later", "marks": 5, "level": "Intermediate"},
        {"text": "Grant 'Always' to avoid prompts", "marks": 2, "level": "Basic"},
        {"text": "Accept everything without reading", "marks": 0, "level": "Wrong"}
      ]
    },
    {
      "questionId": "Q2",
      "question": "A flashlight app requests access to your contacts. What does that suggest?",
      "options": [
        {"text": "The request is unrelated to its function and should be denied", "marks": 10, "level": "Advanced"},
        {"text": "It might be fine if the app is popular", "marks": 5, "level": "Intermediate"},
        {"text": "Apps need contacts to work properly", "marks": 2, "level": "Basic"},
        {"text": "Permissions do not matter", "marks": 0, "level": "Wrong"}
      ]
    },
    {
      "questionId": "Q3",
      "question": "How often should you audit the permissions granted to installed apps?",
      "options": [
        {"text": "Monthly, using the platform privacy dashboard", "marks": 10, "level": "Advanced"},
        {"text": "When something seems wrong", "marks": 5, "level": "Intermediate"},
        {"text": "Only after a factory reset", "marks": 2, "level": "Basic"},
        {"text": "Never", "marks": 0, "level": "Wrong"}
      ]
    },
    {
      "questionId": "Q4",
      "question": "What is the safest setting for microphone access in a chat app?",
      "options": [
        {"text": "Allow only while the app is in use and watch the indicator", "marks": 10, "level": "Advanced"},
        {"text": "Allow once per session", "marks": 5, "level": "Intermediate"},
        {"text": "Allow always", "marks": 2, "level": "Basic"},
        {"text": "Disable the privacy indicator", "marks": 0, "level": "Wrong"}
      ]
    }
  ]
}"#;

/// Guidance covering every non-advanced level of question 1 and 2 only, so
/// coverage audits have something to report.
pub const SAMPLE_GUIDANCE_JSON: &str = r#"{
  "fallback": "Review the platform guide on app permissions and grant only what each feature needs.",
  "entries": [
    {"question": "An app asks for location access while you install it. What do you do?", "level": "intermediate", "text": "Prefer 'While Using App' and revisit grants you made in a hurry."},
    {"question": "An app asks for location access while you install it. What do you do?", "level": "basic", "text": "'Always' location lets apps track you in the background; switch to 'While Using App'."},
    {"question": "An app asks for location access while you install it. What do you do?", "level": "wrong", "text": "Read each permission prompt; location data reveals where you live and work."},
    {"question": "A flashlight app requests access to your contacts. What does that suggest?", "level": "intermediate", "text": "Popularity is not a justification; compare requests against what the app does."},
    {"question": "A flashlight app requests access to your contacts. What does that suggest?", "level": "basic", "text": "A flashlight never needs contacts; such requests often signal data harvesting."},
    {"question": "A flashlight app requests access to your contacts. What does that suggest?", "level": "wrong", "text": "Permissions control what data leaves your phone; deny requests unrelated to the feature."}
  ]
}"#;

#[must_use]
pub fn sample_rubric() -> Rubric {
    Rubric::parse(SAMPLE_RUBRIC_JSON, Some(DocumentFormat::Json)).expect("sample rubric parses")
}

#[must_use]
pub fn sample_guidance() -> GuidanceTable {
    GuidanceTable::parse(SAMPLE_GUIDANCE_JSON, Some(DocumentFormat::Json))
        .expect("sample guidance parses")
}

/// Build selections for `rubric` choosing, per question, the option with the
/// given weight.
#[must_use]
pub fn selections_with_weights(rubric: &Rubric, weights: &[u8]) -> Vec<Selection> {
    rubric
        .questions()
        .iter()
        .zip(weights)
        .map(|(question, weight)| {
            let option = question
                .options
                .iter()
                .find(|o| o.weight == *weight)
                .expect("weight exists in sample rubric");
            Selection::new(&question.text, &option.text)
        })
        .collect()
}

/// Test fixture providing isolated filesystem environment.
pub struct UnitTestFixture {
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
}

impl UnitTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            data_path,
        }
    }

    /// Create a test file with content.
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.data_path.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }
}

impl Default for UnitTestFixture {
    fn default() -> Self {
        Self::new()
    }
}
