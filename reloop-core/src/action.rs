use serde_json::Value;
use std::fmt::Debug;

/// Anything a reducer can receive. The discriminator plays the role of a
/// `type` field: builders reject actions whose discriminator is empty.
///
/// Usually derived with `#[derive(Action)]`.
pub trait Action: Clone + Debug + 'static {
    fn action_type(&self) -> &str;
}

/// JSON actions carry their discriminator under `"type"`.
impl Action for Value {
    fn action_type(&self) -> &str {
        self.get("type").and_then(Value::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Action as DeriveAction;
    use serde_json::json;

    #[derive(Clone, Debug, DeriveAction)]
    enum Msg {
        Unit,
        Tuple(u32),
        Named {
            #[allow(dead_code)]
            value: u32,
        },
        #[action(rename = "GOT")]
        Got,
    }

    #[derive(Clone, Debug, DeriveAction)]
    struct Ping;

    #[derive(Clone, Debug, DeriveAction)]
    #[action(rename = "app/pong")]
    struct Pong {
        #[allow(dead_code)]
        seq: u64,
    }

    #[test]
    fn json_actions_use_type_key() {
        assert_eq!(json!({ "type": "X", "value": 1 }).action_type(), "X");
        assert_eq!(json!({ "kind": "X" }).action_type(), "");
        assert_eq!(json!(null).action_type(), "");
    }

    #[test]
    fn derived_enum_uses_variant_names() {
        assert_eq!(Msg::Unit.action_type(), "Unit");
        assert_eq!(Msg::Tuple(1).action_type(), "Tuple");
        assert_eq!(Msg::Named { value: 2 }.action_type(), "Named");
        assert_eq!(Msg::Got.action_type(), "GOT");
    }

    #[test]
    fn derived_struct_uses_type_name() {
        assert_eq!(Ping.action_type(), "Ping");
        assert_eq!(Pong { seq: 3 }.action_type(), "app/pong");
    }
}
