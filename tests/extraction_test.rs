//! Integration tests for multi-strategy extraction.

mod common;

use coadoc::model::{ExtractionMethod, Page, SourceDocument, WarningKind};
use coadoc::raster::PageRenderer;
use coadoc::{load_bytes, Error, Extractor};
use common::{build_pdf, mock_extractor, test_options, BrokenRasterizer, MockEngine, Script};

#[test]
fn test_digital_pages_never_reach_ocr() {
    let pdf = build_pdf(&[
        Some("Certificate of Analysis Paracetamol"),
        Some("Batch 123 Assay 99.8 percent"),
    ]);
    let doc = load_bytes(&pdf).unwrap();
    let (extractor, counters) = mock_extractor(Script::ByPage, test_options());

    let result = extractor.extract(&doc).unwrap();

    assert_eq!(result.method, ExtractionMethod::Digital);
    assert_eq!(result.succeeded_pages(), 2);
    assert!(result.warnings.is_empty());
    assert!(!result.used_ocr());
    assert_eq!(counters.probes(), 0);
    assert_eq!(counters.renders(), 0);
    assert_eq!(counters.recognitions(), 0);
}

#[test]
fn test_digital_page_and_blank_scan() {
    let pdf = build_pdf(&[Some("Batch 123"), None]);
    let doc = load_bytes(&pdf).unwrap();
    assert_eq!(doc.page_count(), 2);

    let (extractor, counters) = mock_extractor(Script::Sequence(vec![""]), test_options());
    let result = extractor.extract(&doc).unwrap();

    assert!(result.page_text(0).unwrap().contains("Batch 123"));
    assert_eq!(result.page_text(1), Some(""));
    assert_eq!(result.method, ExtractionMethod::Digital);
    assert!(result.text.contains("--- Page 1 ---"));
    assert!(!result.text.contains("--- Page 2"));

    let status = result.page_status(1).unwrap();
    assert!(!status.success);
    assert_eq!(status.method, None);
    assert_eq!(result.failed_pages(), vec![1]);

    assert!(result
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::QualityRejected && w.is_for_page(1)));
    assert!(!result.warnings.iter().any(|w| w.is_for_page(0)));

    // one render shared by both OCR passes
    assert_eq!(counters.renders(), 1);
    assert_eq!(counters.recognitions(), 2);
}

#[test]
fn test_raw_pass_rescues_page_rejected_after_preprocessing() {
    let doc = SourceDocument::from_pages(vec![Page::scanned(0)]);
    let (extractor, counters) = mock_extractor(
        Script::Sequence(vec!["|| ~~ ..", "Storage: below 25 C"]),
        test_options(),
    );

    let result = extractor.extract(&doc).unwrap();

    assert_eq!(result.method, ExtractionMethod::OcrRaw);
    assert_eq!(result.page_text(0), Some("Storage: below 25 C"));
    assert_eq!(result.text, "--- Page 1 (OCR) ---\nStorage: below 25 C");
    assert_eq!(counters.recognitions(), 2);
}

#[test]
fn test_engine_unavailable_is_a_warning() {
    let doc = SourceDocument::from_pages(vec![
        Page::with_text(0, "Certificate of Analysis"),
        Page::scanned(1),
    ]);
    let (extractor, counters) = mock_extractor(Script::Unavailable, test_options());

    let result = extractor.extract(&doc).unwrap();

    assert_eq!(result.method, ExtractionMethod::Digital);
    assert_eq!(result.page_text(1), Some(""));
    assert!(result
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::EngineUnavailable && w.page.is_none()));
    assert!(result
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::QualityRejected && w.is_for_page(1)));
    assert_eq!(counters.probes(), 1);
    assert_eq!(counters.renders(), 0);
    assert_eq!(counters.recognitions(), 0);
}

#[test]
fn test_rendering_failure_skips_ocr_for_page() {
    let counters = common::Counters::default();
    let renderer = PageRenderer::with_strategies(vec![Box::new(BrokenRasterizer)], 300);
    let engine = MockEngine::new(Script::ByPage, counters.clone());
    let extractor = Extractor::with_components(renderer, Box::new(engine), test_options());

    let doc = SourceDocument::from_pages(vec![
        Page::with_text(0, "Certificate of Analysis"),
        Page::scanned(1),
    ]);
    let result = extractor.extract(&doc).unwrap();

    assert_eq!(result.page_text(1), Some(""));
    assert!(result
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::RenderingFailure && w.is_for_page(1)));
    assert!(result
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::QualityRejected && w.is_for_page(1)));
    assert_eq!(counters.recognitions(), 0);
}

#[test]
fn test_parallel_ocr_keeps_page_order() {
    let pages = (0..6).map(Page::scanned).collect();
    let doc = SourceDocument::from_pages(pages);
    let (extractor, counters) = mock_extractor(Script::ByPage, test_options().with_parallel(true));

    let result = extractor.extract(&doc).unwrap();

    assert_eq!(result.method, ExtractionMethod::OcrPreprocessed);
    for i in 0..6 {
        assert_eq!(
            result.page_text(i),
            Some(format!("Recognized page text {}", i + 1).as_str())
        );
    }
    let positions: Vec<usize> = (1..=6)
        .map(|n| result.text.find(&format!("--- Page {} (OCR) ---", n)).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(counters.renders(), 6);
}

#[test]
fn test_plurality_method_across_pages() {
    let doc = SourceDocument::from_pages(vec![
        Page::with_text(0, "Certificate of Analysis"),
        Page::scanned(1),
        Page::scanned(2),
    ]);
    let (extractor, _) = mock_extractor(Script::ByPage, test_options());

    let result = extractor.extract(&doc).unwrap();
    assert_eq!(result.method, ExtractionMethod::OcrPreprocessed);
    assert!(result.used_ocr());
    assert!(result.text.starts_with("--- Page 1 ---\nCertificate of Analysis"));
}

#[test]
fn test_every_page_failing_is_fatal() {
    let doc = SourceDocument::from_pages(vec![Page::scanned(0), Page::scanned(1)]);
    let (extractor, _) = mock_extractor(Script::Sequence(vec!["-"]), test_options());

    let err = extractor.extract(&doc).unwrap_err();
    assert!(err.is_job_fatal());
    match err {
        Error::NoTextExtracted {
            page_count,
            warnings,
        } => {
            assert_eq!(page_count, 2);
            assert_eq!(
                warnings
                    .iter()
                    .filter(|w| w.kind == WarningKind::QualityRejected)
                    .count(),
                2
            );
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_quality_threshold_is_configurable() {
    let doc = SourceDocument::from_pages(vec![Page::scanned(0)]);

    let (strict, _) = mock_extractor(Script::Sequence(vec!["Lot 42 ok"]), test_options());
    assert!(strict.extract(&doc).is_err());

    let (lenient, _) = mock_extractor(
        Script::Sequence(vec!["Lot 42 ok"]),
        test_options().with_min_alnum_chars(5),
    );
    let result = lenient.extract(&doc).unwrap();
    assert_eq!(result.page_text(0), Some("Lot 42 ok"));
    assert_eq!(result.method, ExtractionMethod::OcrPreprocessed);
}

#[test]
fn test_short_text_layer_is_not_gated() {
    let pdf = build_pdf(&[Some("Batch 123"), None]);
    let doc = load_bytes(&pdf).unwrap();
    let (extractor, counters) = mock_extractor(Script::Sequence(vec![""]), test_options());

    let result = extractor.extract(&doc).unwrap();

    assert_eq!(result.page_text(0).map(str::trim), Some("Batch 123"));
    assert_eq!(result.page_text(1), Some(""));
    assert_eq!(result.method, ExtractionMethod::Digital);
    assert_eq!(result.failed_pages(), vec![1]);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::QualityRejected && w.is_for_page(1)));
    assert!(!result.warnings.iter().any(|w| w.is_for_page(0)));
    assert_eq!(counters.renders(), 1);
}
