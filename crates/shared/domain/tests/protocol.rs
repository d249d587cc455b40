use serde_json::json;
use tcard_domain::enhancement::EnhancementInfo;
use tcard_domain::preferences::{ColorSlot, Preferences};
use tcard_domain::protocol::{Request, Response};

#[test]
fn requests_use_camel_case_actions() {
    let raw = json!({ "action": "toggleEnhancement", "name": "weekend-shading", "enabled": false });
    let request: Request = serde_json::from_value(raw).unwrap();
    assert_eq!(
        request,
        Request::ToggleEnhancement { name: "weekend-shading".into(), enabled: false }
    );
    assert_eq!(request.action(), "toggleEnhancement");

    let raw = json!({ "action": "updateRedLineColor", "color": "rgb(1,2,3)" });
    let request: Request = serde_json::from_value(raw).unwrap();
    assert_eq!(request.action(), "updateRedLineColor");
}

#[test]
fn every_variant_action_is_known() {
    for action in Request::ACTIONS {
        assert!(Request::is_known_action(action));
    }
    assert!(!Request::is_known_action("explode"));
}

#[test]
fn status_responses_omit_empty_fields() {
    assert_eq!(serde_json::to_value(Response::ok()).unwrap(), json!({ "success": true }));
    assert_eq!(
        serde_json::to_value(Response::unknown_action()).unwrap(),
        json!({ "success": false, "error": "Unknown action" })
    );
}

#[test]
fn enhancement_listing_uses_camel_case() {
    let response = Response::Enhancements {
        enhancements: vec![EnhancementInfo {
            name: "timecard-totals".into(),
            description: "totals".into(),
            enabled: true,
            default_enabled: true,
        }],
    };
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["enhancements"][0]["defaultEnabled"], json!(true));

    let back: Response = serde_json::from_value(value).unwrap();
    assert_eq!(back, response);
}

#[test]
fn preferences_fall_back_to_slot_defaults() {
    let mut prefs = Preferences::default();
    assert_eq!(prefs.enabled("weekend-shading"), None);
    assert_eq!(prefs.color_or_default(ColorSlot::AlternateRow), ColorSlot::AlternateRow.default_color());

    prefs.set_enabled("weekend-shading", false);
    prefs.set_color(ColorSlot::Weekend, "#000000".parse().unwrap());
    assert_eq!(prefs.enabled("weekend-shading"), Some(false));
    assert_eq!(prefs.color_or_default(ColorSlot::Weekend).to_string(), "rgb(0,0,0)");

    let value = serde_json::to_value(&prefs).unwrap();
    assert_eq!(value["enhancementPreferences"]["weekend-shading"], json!(false));
    assert_eq!(value["weekendShadeColor"], json!("rgb(0,0,0)"));
    assert!(value.get("redLineColor").is_none());
}
