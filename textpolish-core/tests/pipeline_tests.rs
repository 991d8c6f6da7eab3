//! Pipeline boundary tests: raw text in, markup out.
//!
//! Each module exercises one boundary of the pipeline through the public API:
//!
//! - Normalize: pasted text → cleaned text
//! - Classify: cleaned text + toggles + configuration → classified lines
//! - Render: classified lines → interchange / preview markup
//! - Store: persistence, reset, import/export, bundled defaults
//!
//! The shipped default configuration is loaded from `config/app_config.json`.

use std::fs;
use std::path::PathBuf;
use textpolish_core::{
    Category, CategoryConfig, ConfigSource, ConfigStore, Configuration, DocumentProcessor,
    FeatureToggles, FileStorage, ProcessError, RenderTarget, Rule, StructuralClassifier,
    StyleDescriptor, Theme,
};

// ============================================================================
// Helpers
// ============================================================================

fn bundled_config_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/app_config.json")
}

fn categories(text: &str, toggles: &FeatureToggles, config: &Configuration) -> Vec<Category> {
    StructuralClassifier::new()
        .classify(text, toggles, config)
        .into_iter()
        .map(|line| line.category)
        .collect()
}

const WESTERN_DIGITS_OPEN: &str = "<span style=\"font-family:'Times New Roman';";

// ============================================================================
// Boundary 1: normalize
// ============================================================================

mod normalize_boundary {
    use textpolish_core::normalize;

    #[test]
    fn chat_answer_is_compacted() {
        let raw = "• 第一章 概述\n\n\n● 本章说明:目标,范围\n\n  (一) 背景  \n";
        assert_eq!(
            normalize(raw),
            "第一章概述\n本章说明：目标，范围\n（一）背景"
        );
    }

    #[test]
    fn properties_hold_for_mixed_input() {
        let inputs = [
            "Hello, world! a,b",
            "中,文\n\n\n\nEnglish: yes",
            "\t缩进\t文本 \n \n末尾 ",
            "",
        ];
        for input in inputs {
            let out = normalize(input);
            assert!(!out.contains(' ') && !out.contains('\t'), "{out:?}");
            assert!(!out.contains("\n\n"), "{out:?}");
            assert_eq!(normalize(&out), out);
        }
        assert_eq!(normalize("a,b"), "a,b");
        assert_eq!(normalize("中,文"), "中，文");
    }
}

// ============================================================================
// Boundary 2: classify
// ============================================================================

mod classify_boundary {
    use super::*;

    #[test]
    fn end_to_end_scenario_lines() {
        let processor = DocumentProcessor::new();
        let document = processor
            .process(
                "第一章　概述\n\n这是正文内容。",
                &FeatureToggles::default(),
                &Configuration::default(),
            )
            .unwrap();
        assert_eq!(document.lines.len(), 2);
        assert_eq!(document.lines[0].category, Category::H1);
        assert_eq!(document.lines[0].text, "第一章　概述");
        assert_eq!(document.lines[1].category, Category::Normal);
    }

    #[test]
    fn chapter_line_is_only_h1() {
        assert_eq!(
            categories("第一章 前言", &FeatureToggles::default(), &Configuration::default()),
            vec![Category::H1]
        );
    }

    #[test]
    fn h1_wins_when_both_patterns_match() {
        let mut config = Configuration::default();
        config.set(
            Category::H1,
            CategoryConfig::new(
                StyleDescriptor::default(),
                vec![Rule::new(r"^第[一二三四五六七八九十\d]+章", "章节标题")],
            ),
        );
        config.set(
            Category::H2,
            CategoryConfig::new(StyleDescriptor::default(), vec![Rule::new(r"^第.+章", "宽松章节")]),
        );
        assert_eq!(
            categories("第一章 前言", &FeatureToggles::default(), &config),
            vec![Category::H1]
        );
    }

    #[test]
    fn h1_off_falls_through_to_normal() {
        let toggles = FeatureToggles {
            enable_h1: false,
            ..FeatureToggles::default()
        };
        assert_eq!(
            categories("第一章 前言", &toggles, &Configuration::default()),
            vec![Category::Normal]
        );
    }

    #[test]
    fn colon_lead_in_split() {
        let lines = StructuralClassifier::new().classify(
            "结论：本次分析表明情况良好",
            &FeatureToggles::default(),
            &Configuration::default(),
        );
        assert_eq!(lines[0].category, Category::Special);
        assert_eq!(lines[0].lead_in(), Some(("结论：", "本次分析表明情况良好")));
    }

    #[test]
    fn invalid_user_rule_does_not_break_classification() {
        let mut config = Configuration::default();
        let mut h2 = config.get(Category::H2).clone();
        h2.patterns.insert(0, Rule::new("([", "坏规则"));
        config.set(Category::H2, h2);
        assert_eq!(
            categories("一、总体要求\n正文", &FeatureToggles::default(), &config),
            vec![Category::H2, Category::Normal]
        );
    }
}

// ============================================================================
// Boundary 3: render
// ============================================================================

mod render_boundary {
    use super::*;

    fn render(raw: &str, target: RenderTarget) -> String {
        DocumentProcessor::new()
            .process_and_render(raw, &FeatureToggles::default(), &Configuration::default(), target)
            .unwrap()
            .1
    }

    #[test]
    fn interchange_scenario_has_h1_then_normal_paragraph() {
        let out = render("第一章　概述\n\n这是正文内容。", RenderTarget::Interchange);
        let fragment_start = out.find("<!--StartFragment-->").unwrap();
        let fragment_end = out.find("<!--EndFragment-->").unwrap();
        let fragment = &out[fragment_start..fragment_end];

        let blocks: Vec<&str> = fragment.lines().skip(1).collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("<h1><span"));
        assert!(blocks[0].contains("第一章　概述"));
        assert!(blocks[1].starts_with("<p class=\"MsoNormal\"><span"));
        assert!(blocks[1].contains("这是正文内容。"));
    }

    #[test]
    fn digits_wrapped_in_both_targets() {
        for target in [RenderTarget::Interchange, RenderTarget::Preview(Theme::Light)] {
            let out = render("总计1,234.5元", target);
            let wrapped = out.find(WESTERN_DIGITS_OPEN).unwrap();
            let digits = out.find("1,234.5</span>").unwrap();
            assert!(wrapped < digits, "{target:?}");
            assert!(out.contains("总计<span"), "{target:?}");
            assert!(out.contains("</span>元"), "{target:?}");
        }
    }

    #[test]
    fn both_targets_keep_category_and_order() {
        let raw = "前言\n一、总体要求\n说明：见附件\n正文结束。";
        let interchange = render(raw, RenderTarget::Interchange);
        let preview = render(raw, RenderTarget::Preview(Theme::Dark));

        for out in [&interchange, &preview] {
            let positions: Vec<usize> = ["<h1>", "<h2>", "说明：", "正文结束。"]
                .iter()
                .map(|needle| out.find(needle).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
        assert!(interchange.contains("font-size:16.0000pt;"));
        assert!(preview.contains("#74b9ff"));
    }

    #[test]
    fn empty_input_is_a_warning_not_output() {
        let result = DocumentProcessor::new().process_and_render(
            "   \n",
            &FeatureToggles::default(),
            &Configuration::default(),
            RenderTarget::Interchange,
        );
        assert!(matches!(result, Err(ProcessError::EmptyInput)));
    }
}

// ============================================================================
// Boundary 4: configuration store
// ============================================================================

mod store_boundary {
    use super::*;

    #[test]
    fn shipped_config_matches_compiled_defaults() {
        let loaded = textpolish_core::config::load_bundled_defaults(&bundled_config_path()).unwrap();
        assert_eq!(loaded, Configuration::compiled_default());
    }

    #[test]
    fn first_run_uses_shipped_config_then_user_store() {
        let dir = tempfile::tempdir().unwrap();
        let bundled = bundled_config_path();

        let store = ConfigStore::open(Box::new(FileStorage::new(dir.path())), Some(&bundled));
        assert_eq!(store.source(), ConfigSource::BundledFile);

        let reopened = ConfigStore::open(Box::new(FileStorage::new(dir.path())), Some(&bundled));
        assert_eq!(reopened.source(), ConfigSource::UserStore);
    }

    #[test]
    fn export_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let export_path = dir.path().join("rules.json");

        let mut store = ConfigStore::open(Box::new(FileStorage::new(&dir.path().join("a"))), None);
        store.toggle_rule(Category::H2, 1);
        store.add_rule(Category::Special, Rule::new(r"^(注意：)(.*)", "注意事项"));
        let exported = store.all();
        store.export_to(&export_path).unwrap();

        let mut other = ConfigStore::open(Box::new(FileStorage::new(&dir.path().join("b"))), None);
        other.import_from(&export_path).unwrap();
        for category in Category::ALL {
            assert_eq!(other.get(category), exported.get(category).clone());
        }
    }

    #[test]
    fn exported_file_uses_persisted_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let export_path = dir.path().join("rules.json");
        ConfigStore::in_memory().export_to(&export_path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&export_path).unwrap()).unwrap();
        let normal_style = &value["normal"]["style"];
        assert_eq!(normal_style["text_indent"], "36.0000pt");
        assert_eq!(normal_style["font_kerning"], "1.0000pt");
        assert_eq!(value["normal"]["patterns"], serde_json::json!([]));
        assert_eq!(value["special"]["patterns"][2]["pattern"], "^([^：]*：)(.*)");
    }

    #[test]
    fn reset_after_edits_restores_defaults() {
        let mut store = ConfigStore::in_memory();
        store.update_rules(Category::H1, Vec::new());
        store.remove_rule(Category::Special, 0);
        store.reset();
        assert_eq!(store.all(), Configuration::compiled_default());
    }

    #[test]
    fn classification_follows_store_edits() {
        let mut store = ConfigStore::in_memory();
        let toggles = FeatureToggles::default();
        assert_eq!(categories("前言", &toggles, store.configuration()), vec![Category::H1]);

        store.toggle_rule(Category::H1, 1);
        assert_eq!(
            categories("前言", &toggles, store.configuration()),
            vec![Category::Normal]
        );
    }
}
