use float_cmp::assert_approx_eq;

use stencil::{
    ErrorCode, TemplateBuilder,
    batch::{Mapping, ResolvedBy, Row},
    config::AppConfig,
    hints::Hints,
    semantic::TypeKey,
    variable::HierarchyRole,
};

fn builder() -> TemplateBuilder {
    TemplateBuilder::new(AppConfig::default())
}

fn text(content: &str, left: f32, top: f32) -> String {
    format!(
        r#"{{ "type": "text", "content": "{content}",
             "bounds": {{ "left": {left}, "top": {top}, "width": 80, "height": 24 }} }}"#
    )
}

fn guest_card(x: f32, y: f32, name: &str) -> String {
    format!(
        r#"{{ "type": "group",
             "bounds": {{ "left": {x}, "top": {y}, "width": 120, "height": 200 }},
             "children": [
                 {{ "type": "image_embedded",
                    "bounds": {{ "left": {x}, "top": {y}, "width": 100, "height": 100 }} }},
                 {name_text}
             ] }}"#,
        name_text = text(name, x, y + 110.0),
    )
}

fn document(elements: &[String]) -> String {
    format!(
        r#"{{ "document": {{ "name": "test", "width": 1080, "height": 1920 }},
             "layers": [{{ "name": "Content", "elements": [{}] }}] }}"#,
        elements.join(",")
    )
}

#[test]
fn test_phone_is_detected() {
    let builder = builder();
    let parsed = builder
        .parse(&document(&[text("13812345678", 10.0, 10.0)]))
        .expect("Failed to parse");
    let detection = builder.detect(parsed, &Hints::new());

    let record = &detection.variables().variables[0];
    assert_eq!(record.variable_type, TypeKey::Phone);
    assert_approx_eq!(f32, record.confidence, 0.95);
    assert_eq!(record.variable_key, "phone_0");
    assert_eq!(record.current_value, "13812345678");
}

#[test]
fn test_chinese_name_is_detected() {
    let builder = builder();
    let parsed = builder
        .parse(&document(&[text("张三", 10.0, 10.0)]))
        .expect("Failed to parse");
    let detection = builder.detect(parsed, &Hints::new());

    let record = &detection.variables().variables[0];
    assert_eq!(record.variable_type, TypeKey::Name);
    assert_approx_eq!(f32, record.confidence, 0.85);
}

#[test]
fn test_guest_card_binds_optional_title() {
    let card = r#"{ "type": "group",
        "bounds": { "left": 50, "top": 100, "width": 200, "height": 220 },
        "children": [
            { "type": "image_embedded", "bounds": { "left": 50, "top": 100, "width": 100, "height": 100 } },
            { "type": "text", "content": "张三", "bounds": { "left": 50, "top": 220, "width": 80, "height": 24 } },
            { "type": "text", "content": "CEO", "bounds": { "left": 50, "top": 260, "width": 80, "height": 24 } }
        ] }"#;

    let builder = builder();
    let parsed = builder
        .parse(&document(&[card.to_string()]))
        .expect("Failed to parse");
    let detection = builder.detect(parsed, &Hints::new());
    let patterns = &detection.patterns().patterns;

    assert_eq!(patterns.len(), 1);
    let guest = &patterns[0];
    assert_eq!(guest.pattern_id, "GUEST_CARD");
    assert_eq!(guest.repeat_total, 1);
    assert_eq!(
        guest.fields.keys().map(String::as_str).collect::<Vec<_>>(),
        ["avatar", "name", "title"]
    );
    assert_eq!(guest.fields["name"].variable_key, "guest.name");
    assert_eq!(guest.fields["title"].current_value, "CEO");
    assert_approx_eq!(f32, guest.confidence, 6.0 / 8.0);

    let summary = &detection.patterns().summary;
    assert_eq!(summary.total_matches, 1);
    assert_eq!(summary.by_pattern["GUEST_CARD"], 1);
    assert!(summary.repeat_groups.is_empty());
}

#[test]
fn test_repeat_group_reading_order() {
    let builder = builder();
    let parsed = builder
        .parse(&document(&[
            guest_card(50.0, 400.0, "王五"),
            guest_card(200.0, 105.0, "李四"),
            guest_card(50.0, 100.0, "张三"),
        ]))
        .expect("Failed to parse");
    let detection = builder.detect(parsed, &Hints::new());
    let patterns = &detection.patterns().patterns;

    let order: Vec<_> = patterns
        .iter()
        .map(|p| (p.repeat_index, p.fields["name"].current_value.as_str()))
        .collect();
    assert_eq!(order, [(0, "张三"), (1, "李四"), (2, "王五")]);
    assert!(patterns.iter().all(|p| p.repeat_total == 3));
    assert_eq!(patterns[1].fields["name"].variable_key, "guest_1.name");

    let summary = &detection.patterns().summary;
    assert_eq!(summary.repeat_groups.len(), 1);
    assert_eq!(summary.repeat_groups[0].count, 3);
    assert!(detection.integrity().validation_report.valid);
}

#[test]
fn test_batch_plan_resolves_or_fails() {
    let builder = builder();
    let parsed = builder
        .parse(&document(&[
            guest_card(50.0, 100.0, "张三"),
            guest_card(200.0, 100.0, "李四"),
        ]))
        .expect("Failed to parse");
    let detection = builder.detect(parsed, &Hints::new());
    let variables = &detection.variables().variables;
    assert_eq!(
        detection.variables().get("guest_0.name").unwrap().current_value,
        "张三"
    );

    let mapping: Mapping = [("guest_0.name".to_string(), "name".to_string())]
        .into_iter()
        .collect();
    let rows: Vec<Row> = vec![[("name".to_string(), "赵六".to_string())].into_iter().collect()];

    let plan = builder.plan(detection.document(), variables, &mapping, &rows);
    assert_eq!(plan.success_count, 1);
    let resolved = &plan.files[0].success[0];
    assert_eq!(resolved.field, "guest_0.name");
    assert_eq!(resolved.value, "赵六");
    assert_eq!(resolved.resolved_by, ResolvedBy::Content);

    let unrelated = builder
        .parse(&document(&[text("欢迎光临", 10.0, 10.0)]))
        .expect("Failed to parse");
    let plan = builder.plan(&unrelated.document, variables, &mapping, &rows);
    assert_eq!(plan.failed_count, 1);
    assert_eq!(plan.files[0].failed[0].error, "not found");
}

#[test]
fn test_hints_from_classifier_response() {
    let builder = builder();
    let source = r#"{
        "document": { "width": 800, "height": 600 },
        "elements": [
            { "id": "deco", "type": "text", "content": "张三",
              "bounds": { "left": 10, "top": 10, "width": 60, "height": 20 } },
            { "id": "body", "type": "text", "content": "13812345678",
              "bounds": { "left": 10, "top": 50, "width": 160, "height": 20 } }
        ]
    }"#;
    let hints = builder
        .parse_hints(
            r#"{ "hierarchy_predictions": [
                { "element_id": "deco", "predicted_role": "decoration", "confidence": 0.92 },
                { "element_id": "body", "predicted_role": "content_primary", "confidence": 0.81 }
            ] }"#,
        )
        .expect("Failed to parse hints");

    let detection = builder.detect(builder.parse(source).expect("Failed to parse"), &hints);
    let variables = &detection.variables().variables;

    assert_eq!(variables.len(), 1);
    assert_eq!(variables[0].element_id, "body");
    assert_eq!(variables[0].hierarchy_role, Some(HierarchyRole::ContentPrimary));
}

#[test]
fn test_integrity_findings_reach_the_validation_report() {
    let source = r#"{
        "document": { "width": 800, "height": 600 },
        "elements": [
            { "id": "dup", "type": "text", "content": "a",
              "bounds": { "left": 10, "top": 10, "width": 60, "height": 20 } },
            { "id": "dup", "type": "text", "content": "b",
              "bounds": { "left": 10, "top": 50, "width": 60, "height": 20 } },
            { "id": "far", "type": "text", "content": "c",
              "bounds": { "left": 2000, "top": 50, "width": 60, "height": 20 } }
        ]
    }"#;

    let builder = builder();
    let detection = builder.detect(builder.parse(source).expect("Failed to parse"), &Hints::new());
    let integrity = detection.integrity();

    assert!(!integrity.integrity_check.id_check.unique);
    assert_eq!(integrity.integrity_check.id_check.duplicates[0].indices, [0, 1]);
    assert_eq!(integrity.integrity_check.bounds_check.out_of_bounds, ["far"]);

    let codes: Vec<_> = integrity
        .validation_report
        .diagnostics
        .iter()
        .filter_map(|d| d.code())
        .collect();
    assert_eq!(codes, [ErrorCode::I001, ErrorCode::I003]);
    assert!(!integrity.validation_report.valid);
}

#[test]
fn test_detection_json_shape() {
    let builder = builder();
    let parsed = builder
        .parse(&document(&[guest_card(50.0, 100.0, "张三")]))
        .expect("Failed to parse");
    let detection = builder.detect(parsed, &Hints::new());
    let json = serde_json::to_value(&detection).unwrap();

    assert_eq!(json["variables"]["totalVariables"], 2);
    assert_eq!(json["patterns"]["patterns"][0]["patternId"], "GUEST_CARD");
    assert_eq!(json["patterns"]["summary"]["totalMatches"], 1);
    assert_eq!(json["integrity"]["validationReport"]["valid"], true);
    assert!(json["integrity"]["integrityCheck"]["idCheck"]["unique"].as_bool().unwrap());
    assert!(json.get("document").is_none());
}

#[test]
fn test_parse_error_keeps_source() {
    let err = builder().parse("{ nope").unwrap_err();
    match err {
        stencil::StencilError::Parse { err, src } => {
            assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E001));
            assert_eq!(src, "{ nope");
        }
        other => panic!("unexpected error: {other}"),
    }
}
