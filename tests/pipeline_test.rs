//! Integration tests for the translation job runner.

mod common;

use coadoc::model::{ExtractionMethod, WarningKind};
use coadoc::pipeline::{Pipeline, PipelineConfig};
use coadoc::render::{JsonFormat, JsonRenderer};
use coadoc::translate::{Glossary, TranslationMode, TranslationResponse};
use coadoc::Error;
use common::{build_pdf, mock_extractor, test_options, MockRenderer, MockTranslator, Script};
use serde_json::json;

const STRUCTURED_ANSWER: &str = r#"{
  "document_title": "Сертификат анализа",
  "product_name": "Парацетамол",
  "batch_info": "Серия: 123",
  "test_results": [
    {"parameter": "pH", "specification": "5,5 - 6,5", "result": "6,1"},
    {"parameter": "Количественное определение", "result": "99,8 %"}
  ],
  "conclusion": "Соответствует"
}"#;

fn pipeline(
    config: PipelineConfig,
    translator: &MockTranslator,
    renderer: &MockRenderer,
) -> Pipeline {
    let (extractor, _) = mock_extractor(Script::Sequence(vec![""]), test_options());
    Pipeline::with_extractor(
        config,
        extractor,
        Box::new(translator.clone()),
        Box::new(renderer.clone()),
    )
}

#[test]
fn test_full_job() {
    let pdf = build_pdf(&[Some("Batch 123"), None]);
    let translator = MockTranslator::new(vec![Ok(TranslationResponse::Structured(
        STRUCTURED_ANSWER.to_string(),
    ))]);
    let renderer = MockRenderer::default();
    let pipeline = pipeline(
        PipelineConfig::new().with_template("coa_template.docx"),
        &translator,
        &renderer,
    );

    let output = pipeline.run("coa.pdf", &pdf).unwrap();

    assert_eq!(output.document, b"rendered");
    assert_eq!(output.content.text("product_name"), Some("Парацетамол"));
    assert_eq!(output.content.table("test_results").unwrap().row_count(), 2);
    assert_eq!(output.metadata.original_filename, "coa.pdf");
    assert_eq!(output.metadata.extraction_method, ExtractionMethod::Digital);
    assert_eq!(output.metadata.model, "gpt-4o");
    assert!(output
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::QualityRejected && w.is_for_page(1)));

    let seen = translator.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].mode, TranslationMode::Structured);
    assert!(seen[0].text.contains("Batch 123"));
    assert_eq!(seen[0].schema_len, 10);
    assert!(seen[0].glossary_len > 0);

    let calls = renderer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, output.content);
    assert_eq!(calls[0].2.as_deref(), Some("coa_template.docx"));

    let summary = output.summary();
    assert_eq!(summary.page_count, 2);
    assert_eq!(summary.failed_pages, vec![1]);
    assert_eq!(summary.method, ExtractionMethod::Digital);
    assert_eq!(summary.filled_sections, 5);
    assert!(summary.to_string().starts_with("coa.pdf: 2 page(s)"));
}

#[test]
fn test_translation_failure_ends_job() {
    let pdf = build_pdf(&[Some("Certificate of Analysis Batch 123")]);
    let translator = MockTranslator::new(vec![Err(Error::TranslationService(
        "401 Unauthorized".to_string(),
    ))]);
    let renderer = MockRenderer::default();
    let pipeline = pipeline(PipelineConfig::new(), &translator, &renderer);

    let err = pipeline.run("coa.pdf", &pdf).unwrap_err();

    assert!(err.is_job_fatal());
    assert!(err.to_string().contains("401 Unauthorized"));
    assert!(renderer.calls().is_empty());
}

#[test]
fn test_extraction_failure_skips_translation() {
    let pdf = build_pdf(&[None, None]);
    let translator = MockTranslator::default();
    let renderer = MockRenderer::default();
    let pipeline = pipeline(PipelineConfig::new(), &translator, &renderer);

    let err = pipeline.run("scan.pdf", &pdf).unwrap_err();

    assert!(matches!(err, Error::NoTextExtracted { page_count: 2, .. }));
    assert!(translator.seen().is_empty());
    assert!(renderer.calls().is_empty());
}

#[test]
fn test_unusable_json_is_retried_in_plain_mode() {
    let translator = MockTranslator::new(vec![
        Ok(TranslationResponse::Structured("Here is the translation: ...".to_string())),
        Ok(TranslationResponse::PlainText(
            "Сертификат анализа\nСерия 123".to_string(),
        )),
    ]);
    let renderer = MockRenderer::default();
    let pipeline = pipeline(PipelineConfig::new(), &translator, &renderer);

    let mapped = pipeline.translate("Certificate of Analysis\nBatch 123").unwrap();

    assert_eq!(mapped.content.text("notes"), Some("Сертификат анализа\nСерия 123"));
    assert!(mapped.is_schema_mismatch());

    let seen = translator.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].mode, TranslationMode::Structured);
    assert_eq!(seen[1].mode, TranslationMode::Plain);
    assert_eq!(seen[1].text, seen[0].text);
}

#[test]
fn test_retry_can_be_disabled() {
    let translator = MockTranslator::new(vec![Ok(TranslationResponse::Structured(
        "[1, 2, 3]".to_string(),
    ))]);
    let renderer = MockRenderer::default();
    let pipeline = pipeline(
        PipelineConfig::new().with_plain_retry(false),
        &translator,
        &renderer,
    );

    let mapped = pipeline.translate("Certificate of Analysis").unwrap();

    assert_eq!(translator.seen().len(), 1);
    assert!(mapped.is_schema_mismatch());
    assert_eq!(mapped.content.text("notes"), Some("[1,2,3]"));
}

#[test]
fn test_plain_mode_config() {
    let translator = MockTranslator::new(vec![Ok(TranslationResponse::PlainText(
        "Перевод".to_string(),
    ))]);
    let renderer = MockRenderer::default();
    let pipeline = pipeline(
        PipelineConfig::new()
            .with_mode(TranslationMode::Plain)
            .with_model("gpt-4o-mini")
            .with_glossary(Glossary::new()),
        &translator,
        &renderer,
    );

    let mapped = pipeline.translate("Translation").unwrap();

    assert_eq!(mapped.content.text("notes"), Some("Перевод"));
    assert!(mapped.warnings.is_empty());
    let seen = translator.seen();
    assert_eq!(seen[0].mode, TranslationMode::Plain);
    assert_eq!(seen[0].model, "gpt-4o-mini");
    assert_eq!(seen[0].glossary_len, 0);
}

#[test]
fn test_json_renderer_end_to_end() {
    let pdf = build_pdf(&[Some("Certificate of Analysis Batch 123")]);
    let translator = MockTranslator::new(vec![Ok(TranslationResponse::Json(json!({
        "product_name": "Парацетамол",
        "unexpected": true
    })))]);
    let (extractor, _) = mock_extractor(Script::ByPage, test_options());
    let pipeline = Pipeline::with_extractor(
        PipelineConfig::new(),
        extractor,
        Box::new(translator),
        Box::new(JsonRenderer::new(JsonFormat::Compact)),
    );

    let output = pipeline.run("coa.pdf", &pdf).unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&output.document).unwrap();

    assert_eq!(payload["title"], "СЕРТИФИКАТ АНАЛИЗА");
    assert_eq!(payload["original_filename"], "coa.pdf");
    assert_eq!(payload["extraction_method"], "digital");
    assert_eq!(payload["sections"][2]["content"], "Парацетамол");
    assert_eq!(output.dropped_keys, vec!["unexpected"]);
}
