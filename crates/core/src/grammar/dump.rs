use crate::sink::DirectiveLog;

/// Serialize recorded directives to a pretty-printed JSON array.
pub fn to_pretty_json(log: &DirectiveLog) -> serde_json::Result<String> {
    serde_json::to_string_pretty(log.directives())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::directive::{ResetPosition, SpecialPosition, Strength};
    use crate::sink::Sink;

    #[test]
    fn dump_is_tagged_array() {
        let mut log = DirectiveLog::new();
        log.add_reset(
            Strength::Identical,
            &ResetPosition::Special(SpecialPosition::LastVariable),
        )
        .unwrap();
        log.add_relation(Strength::Primary, "", "x", "").unwrap();
        let json = to_pretty_json(&log).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["kind"], "reset");
        assert_eq!(value[0]["strength"], "identical");
        assert_eq!(value[0]["position"]["kind"], "special");
        assert_eq!(value[0]["position"]["value"], "last_variable");
        assert_eq!(value[1]["kind"], "relation");
        assert_eq!(value[1]["target"], "x");
    }
}
