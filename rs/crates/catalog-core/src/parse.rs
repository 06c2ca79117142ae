use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::ordering::{SortField, SortSpec};
use crate::predicate::Toggle;
use crate::view::Layout;
use crate::Action;

#[derive(Deserialize)]
struct Envelope {
    action: String,
    #[serde(default)]
    payload: Value,
}

fn payload_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

/// Decode `{"action":"name","payload":{...}}`. Anything malformed or
/// unrecognised becomes [`Action::Unknown`].
pub fn parse_action(input: &[u8]) -> Action {
    let env: Envelope = match serde_json::from_slice(input) {
        Ok(env) => env,
        Err(e) => {
            debug!(error = %e, "unparsable action");
            return Action::Unknown;
        }
    };
    let action = action_from_parts(&env.action, &env.payload);
    if matches!(action, Action::Unknown) {
        debug!(name = %env.action, "ignoring unknown action");
    }
    action
}

/// Build an action from its name and payload, as received on
/// `POST /actions/<name>`.
pub fn action_from_parts(name: &str, payload: &Value) -> Action {
    let (head, arg) = match name.split_once(':') {
        Some((h, a)) => (h, Some(a)),
        None => (name, None),
    };

    match (head, arg) {
        ("search_input", None) => {
            Action::SearchInput(payload_str(payload, "value").unwrap_or_default().to_string())
        }
        ("toggle", Some(t)) => match t.parse::<Toggle>() {
            Ok(toggle) => Action::Toggle {
                toggle,
                checked: payload.get("checked").and_then(Value::as_bool),
            },
            Err(_) => Action::Unknown,
        },
        ("select_sort", None) => match payload_str(payload, "value").map(str::trim) {
            None | Some("") => Action::SelectSort(None),
            Some(v) => v.parse::<SortSpec>().map(|s| Action::SelectSort(Some(s))).unwrap_or(Action::Unknown),
        },
        ("sort_header", Some(f)) => f.parse::<SortField>().map(Action::SortHeader).unwrap_or(Action::Unknown),
        ("set_layout", Some(l)) => l.parse::<Layout>().map(Action::SetLayout).unwrap_or(Action::Unknown),
        ("tick", None) => Action::Tick,
        _ => Action::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::Direction;

    #[test]
    fn test_search_input() {
        let a = parse_action(br#"{"action":"search_input","payload":{"value":"shinano"}}"#);
        assert!(matches!(a, Action::SearchInput(ref v) if v == "shinano"));
        let a = parse_action(br#"{"action":"search_input"}"#);
        assert!(matches!(a, Action::SearchInput(ref v) if v.is_empty()));
    }

    #[test]
    fn test_toggle_with_and_without_checked() {
        let a = parse_action(br#"{"action":"toggle:paid","payload":{"checked":true}}"#);
        assert!(matches!(a, Action::Toggle { toggle: Toggle::Paid, checked: Some(true) }));
        let a = parse_action(br#"{"action":"toggle:showAll","payload":{}}"#);
        assert!(matches!(a, Action::Toggle { toggle: Toggle::ShowAll, checked: None }));
        assert!(matches!(parse_action(br#"{"action":"toggle:cheap"}"#), Action::Unknown));
    }

    #[test]
    fn test_sort_actions() {
        let a = parse_action(br#"{"action":"select_sort","payload":{"value":"updatedDate-desc"}}"#);
        assert!(matches!(
            a,
            Action::SelectSort(Some(SortSpec { field: SortField::UpdatedDate, direction: Direction::Desc }))
        ));
        let a = parse_action(br#"{"action":"select_sort","payload":{"value":""}}"#);
        assert!(matches!(a, Action::SelectSort(None)));
        let a = parse_action(br#"{"action":"sort_header:avatarItemId"}"#);
        assert!(matches!(a, Action::SortHeader(SortField::AvatarItemId)));
        assert!(matches!(parse_action(br#"{"action":"sort_header:height"}"#), Action::Unknown));
    }

    #[test]
    fn test_layout_tick_and_garbage() {
        assert!(matches!(parse_action(br#"{"action":"set_layout:table"}"#), Action::SetLayout(Layout::Table)));
        assert!(matches!(parse_action(br#"{"action":"tick"}"#), Action::Tick));
        assert!(matches!(parse_action(b"not json"), Action::Unknown));
        assert!(matches!(parse_action(br#"{"action":"explode"}"#), Action::Unknown));
    }
}
