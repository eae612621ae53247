//! Tests for reset/relation chains and the top-level driver.
//!
//! Settings live in `settings.rs`, imports in `imports.rs`, and error
//! positions and context windows in `errors.rs`.

mod common;

use common::{FailingSink, parse, parse_err, relations, resets, text};
use coll_rules_core::{
    CollationSettings, Directive, DirectiveLog, Relation, ResetPosition, RuleParser,
    SettingsFlags, SpecialPosition, Strength, codes, to_pretty_json,
};
use rstest::rstest;

fn rel(strength: Strength, target: &str) -> (Strength, String) {
    (strength, target.to_string())
}

// ─── Relation operators ─────────────────────────────────────────────────────

#[test]
fn every_operator_maps_to_its_strength() {
    let (log, _) = parse("&a < b << c <<< d ; e , f = g").unwrap();
    assert_eq!(resets(&log), vec![(Strength::Identical, text("a"))]);
    assert_eq!(
        relations(&log),
        vec![
            rel(Strength::Primary, "b"),
            rel(Strength::Secondary, "c"),
            rel(Strength::Tertiary, "d"),
            rel(Strength::Secondary, "e"),
            rel(Strength::Tertiary, "f"),
            rel(Strength::Identical, "g"),
        ]
    );
}

#[test]
fn operators_need_no_surrounding_space() {
    let (log, _) = parse("&a<b<<c<<<d;e,f=g").unwrap();
    assert_eq!(relations(&log).len(), 6);
}

#[test]
fn four_angle_brackets_are_not_an_operator() {
    let err = parse_err("&a <<<< b");
    assert_eq!(err.code, codes::MISSING_STRING);
    assert_eq!(err.offset, 3);
}

#[test]
fn several_chains() {
    let (log, _) = parse("&a < b & c << d\n&e = f").unwrap();
    assert_eq!(
        resets(&log),
        vec![
            (Strength::Identical, text("a")),
            (Strength::Identical, text("c")),
            (Strength::Identical, text("e")),
        ]
    );
    let order: Vec<_> = log
        .directives()
        .iter()
        .map(|d| matches!(d, Directive::Reset { .. }))
        .collect();
    assert_eq!(order, [true, false, true, false, true, false]);
}

// ─── Tailoring strings ──────────────────────────────────────────────────────

#[test]
fn prefix_and_extension() {
    let (log, _) = parse("&a < c|h / k").unwrap();
    let r: Vec<&Relation> = log.relations().collect();
    assert_eq!(
        r,
        [&Relation {
            strength: Strength::Primary,
            prefix: "c".into(),
            target: "h".into(),
            extension: "k".into(),
        }]
    );
}

#[test]
fn extension_without_prefix() {
    let (log, _) = parse("&x << ae/e").unwrap();
    let r = log.relations().next().unwrap();
    assert!(r.prefix.is_empty());
    assert_eq!(r.target, "ae");
    assert_eq!(r.extension, "e");
}

#[test]
fn strings_are_composed_contiguously() {
    let (log, _) = parse("&e\u{301} < o\u{308} | u\u{308} / a\u{30A}").unwrap();
    assert_eq!(resets(&log), vec![(Strength::Identical, text("\u{E9}"))]);
    let r = log.relations().next().unwrap();
    assert_eq!(r.prefix, "\u{F6}");
    assert_eq!(r.target, "\u{FC}");
    assert_eq!(r.extension, "\u{E5}");
}

#[test]
fn composition_is_idempotent_on_emitted_strings() {
    let (first, _) = parse("&a < e\u{301}\u{323} < \u{1100}\u{1161}").unwrap();
    for r in first.relations() {
        let (again, _) = parse(&format!("&a < {}", r.target)).unwrap();
        assert_eq!(again.relations().next().unwrap().target, r.target);
    }
}

#[rstest]
#[case("&a < r''t", "r't")]
#[case("&a < '<<'", "<<")]
#[case("&a < 'it''s'", "it's")]
#[case("&a < \\<x", "<x")]
#[case("&a < '&'b", "&b")]
#[case("&a < \u{1F600}", "\u{1F600}")]
fn quoting_and_escapes(#[case] rules: &str, #[case] target: &str) {
    let (log, _) = parse(rules).unwrap();
    assert_eq!(relations(&log), vec![rel(Strength::Primary, target)]);
}

#[test]
fn quoted_reset_text() {
    let (log, _) = parse("&'\\u0020' < x").unwrap();
    assert_eq!(resets(&log)[0].1, text("\\u0020"));
}

// ─── Special positions and reset-before ─────────────────────────────────────

#[rstest]
#[case("&[last variable] < x", SpecialPosition::LastVariable)]
#[case("&[variable top] < x", SpecialPosition::LastVariable)]
#[case("&[top] < x", SpecialPosition::LastRegular)]
#[case("&[first  regular]<x", SpecialPosition::FirstRegular)]
#[case("& [ first tertiary ignorable ] < x", SpecialPosition::FirstTertiaryIgnorable)]
#[case("&[last trailing] < x", SpecialPosition::LastTrailing)]
fn special_reset_positions(#[case] rules: &str, #[case] expected: SpecialPosition) {
    let (log, _) = parse(rules).unwrap();
    assert_eq!(
        resets(&log),
        vec![(Strength::Identical, ResetPosition::Special(expected))]
    );
}

#[rstest]
#[case("&[first vowel] < x")]
#[case("&[first variable < x")]
#[case("&[] < x")]
fn invalid_special_positions(#[case] rules: &str) {
    assert_eq!(parse_err(rules).code, codes::INVALID_SPECIAL_POSITION);
}

#[rstest]
#[case("&[before 1] a < b", Strength::Primary)]
#[case("&[before 2] a << b ; c", Strength::Secondary)]
#[case("&[before 2]a<<b<<<c", Strength::Secondary)]
#[case("&[before  3] a <<< b = c", Strength::Tertiary)]
#[case("&[before 1][last variable] < b", Strength::Primary)]
fn reset_before_chains(#[case] rules: &str, #[case] strength: Strength) {
    let (log, _) = parse(rules).unwrap();
    assert_eq!(resets(&log)[0].0, strength);
}

#[rstest]
#[case("&[before 1] a << b", codes::BEFORE_STRENGTH_MISMATCH)]
#[case("&[before 3] a < b", codes::BEFORE_STRENGTH_MISMATCH)]
#[case("&[before 2] a << b < c", codes::BEFORE_STRENGTH_STRONGER)]
#[case("&[before 3] a <<< b << c", codes::BEFORE_STRENGTH_STRONGER)]
#[case("&[before 1] < a < b", codes::MISSING_STRING)]
fn reset_before_violations(#[case] rules: &str, #[case] code: &str) {
    assert_eq!(parse_err(rules).code, code);
}

#[test]
fn malformed_before_is_a_special_position() {
    // Without the space `[before1]` is read as a (bad) special position.
    assert_eq!(
        parse_err("&[before1] a < b").code,
        codes::INVALID_SPECIAL_POSITION
    );
}

// ─── Starred relations ──────────────────────────────────────────────────────

#[test]
fn starred_range_equals_individual_relations() {
    let (starred, _) = parse("&x <<* a-f").unwrap();
    let (single, _) = parse("&x << a << b << c << d << e << f").unwrap();
    assert_eq!(starred, single);
}

#[test]
fn starred_mix_of_runs_and_ranges() {
    let (log, _) = parse("&x <*pq-sz").unwrap();
    let targets: Vec<_> = relations(&log).into_iter().map(|(_, t)| t).collect();
    assert_eq!(targets, ["p", "q", "r", "s", "z"]);
    assert!(log.relations().all(|r| r.strength == Strength::Primary));
}

#[test]
fn starred_equal_endpoints_emit_once() {
    let (log, _) = parse("&x =* a-a").unwrap();
    assert_eq!(relations(&log), vec![rel(Strength::Identical, "a")]);
}

#[test]
fn starred_supplementary_range() {
    let (log, _) = parse("&x <*\u{1F600}-\u{1F602}").unwrap();
    assert_eq!(log.relations().count(), 3);
}

#[rstest]
#[case("&x <* f-a", codes::RANGE_INVERTED)]
#[case("&x <* -a", codes::RANGE_WITHOUT_START)]
#[case("&x <* a-", codes::RANGE_WITHOUT_END)]
#[case("&x <* a-c-e", codes::RANGE_WITHOUT_START)]
#[case("&x <* \u{E9}", codes::STARRED_NOT_INERT)]
#[case("&x <* a\u{301}", codes::STARRED_NOT_INERT)]
#[case("&x <* a-\u{E0}", codes::STARRED_NOT_INERT)]
#[case("&x <*", codes::MISSING_STRING)]
fn starred_errors(#[case] rules: &str, #[case] code: &str) {
    assert_eq!(parse_err(rules).code, code);
}

#[test]
fn starred_range_stops_at_first_non_inert_code_point() {
    let mut log = DirectiveLog::new();
    let mut settings = CollationSettings::default();
    let err = RuleParser::new()
        .parse("&x <* \u{BE}-\u{C6}", &mut log, &mut settings)
        .unwrap_err();
    assert_eq!(err.code, codes::STARRED_NOT_INERT);
    // U+00BE and U+00BF were emitted before U+00C0 failed.
    assert_eq!(log.relations().count(), 2);
}

// ─── Top-level driver ───────────────────────────────────────────────────────

#[test]
fn comments_inside_a_chain() {
    let (log, _) = parse("&a < b # comment\n < c").unwrap();
    assert_eq!(
        relations(&log),
        vec![rel(Strength::Primary, "b"), rel(Strength::Primary, "c")]
    );
}

#[test]
fn comments_and_whitespace_at_top_level() {
    let (log, _) = parse("# header\r\n\t&a\u{2028}<\u{200E}b # trailing").unwrap();
    assert_eq!(relations(&log), vec![rel(Strength::Primary, "b")]);
}

#[test]
fn at_sign_sets_backward_secondary() {
    let (_, settings) = parse("@ &a < b").unwrap();
    assert!(settings.has_flag(SettingsFlags::BACKWARD_SECONDARY));
}

#[test]
fn exclamation_mark_is_ignored() {
    let (log, settings) = parse("! &a < b").unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(settings, CollationSettings::default());
}

#[test]
fn empty_rules() {
    let (log, settings) = parse("").unwrap();
    assert!(log.is_empty());
    assert_eq!(settings, CollationSettings::default());
    assert!(parse("  \n # only a comment").unwrap().0.is_empty());
}

#[rstest]
#[case("&a", codes::RESET_WITHOUT_RELATION)]
#[case("&a # no relation\n", codes::RESET_WITHOUT_RELATION)]
#[case("&", codes::RESET_WITHOUT_POSITION)]
#[case("&   ", codes::RESET_WITHOUT_POSITION)]
#[case("a < b", codes::UNEXPECTED_CHARACTER)]
#[case("&a < b ]", codes::UNEXPECTED_CHARACTER)]
#[case("&a < 'b", codes::UNTERMINATED_QUOTE)]
#[case("&a < b\\", codes::DANGLING_ESCAPE)]
#[case("&a < \u{FFFE}", codes::NONCHARACTER)]
fn grammar_errors(#[case] rules: &str, #[case] code: &str) {
    assert_eq!(parse_err(rules).code, code);
}

#[test]
fn tailoring_string_length_limit() {
    let ok = format!("&a < {}", "b".repeat(31));
    assert!(parse(&ok).is_ok());
    let long = format!("&a < {}", "b".repeat(32));
    assert_eq!(parse_err(&long).code, codes::TAILORING_STRING_TOO_LONG);
    // The reset string is limited too.
    let long_reset = format!("&{} < b", "\u{1EA1}".repeat(16));
    assert_eq!(parse_err(&long_reset).code, codes::TAILORING_STRING_TOO_LONG);
}

#[test]
fn partial_output_is_kept_on_error() {
    let mut log = DirectiveLog::new();
    let mut settings = CollationSettings::default();
    let err = RuleParser::new()
        .parse("[strength 2] &a < b &c", &mut log, &mut settings)
        .unwrap_err();
    assert_eq!(err.code, codes::RESET_WITHOUT_RELATION);
    assert_eq!(settings.strength, Strength::Secondary);
    assert_eq!(log.len(), 3);
}

#[test]
fn sink_rejection_stops_parsing() {
    let mut sink = FailingSink::new(2);
    let mut settings = CollationSettings::default();
    let err = RuleParser::new()
        .parse("&a < b < c < d", &mut sink, &mut settings)
        .unwrap_err();
    assert_eq!(err.code, codes::SINK_REJECTED);
    assert_eq!(err.reason, "builder is full");
    assert_eq!(err.offset, 7);
    assert_eq!(sink.log.len(), 2);
}

#[test]
fn parse_through_a_trait_object() {
    let mut log = DirectiveLog::new();
    let sink: &mut dyn coll_rules_core::Sink = &mut log;
    let mut settings = CollationSettings::default();
    RuleParser::new()
        .parse("&a < b", sink, &mut settings)
        .unwrap();
    assert_eq!(log.len(), 2);
}

// ─── UTF-16 input ───────────────────────────────────────────────────────────

#[test]
fn utf16_input() {
    let units: Vec<u16> = "&a < \u{1F600}".encode_utf16().collect();
    let mut log = DirectiveLog::new();
    let mut settings = CollationSettings::default();
    RuleParser::new()
        .parse_utf16(&units, &mut log, &mut settings)
        .unwrap();
    assert_eq!(relations(&log), vec![rel(Strength::Primary, "\u{1F600}")]);
}

#[test]
fn utf16_unpaired_surrogate() {
    let mut units: Vec<u16> = "&\u{E9} < ".encode_utf16().collect();
    units.push(0xD800);
    units.extend("b".encode_utf16());
    let mut log = DirectiveLog::new();
    let mut settings = CollationSettings::default();
    let err = RuleParser::new()
        .parse_utf16(&units, &mut log, &mut settings)
        .unwrap_err();
    assert_eq!(err.code, codes::UNPAIRED_SURROGATE);
    // "&é < " is six bytes of UTF-8.
    assert_eq!(err.offset, 6);
    assert_eq!(err.pre_context, "&\u{E9} < ");
    assert!(log.is_empty());
}

// ─── Recording and dumping ──────────────────────────────────────────────────

#[test]
fn json_dump_of_a_parse() {
    let (log, _) = parse("&[before 2] a << b|c").unwrap();
    let json = to_pretty_json(&log).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {
                "kind": "reset",
                "strength": "secondary",
                "position": { "kind": "text", "value": "a" }
            },
            {
                "kind": "relation",
                "strength": "secondary",
                "prefix": "b",
                "target": "c"
            }
        ])
    );
}
