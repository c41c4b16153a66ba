use racescan::config::{EngineConfig, UnknownDatePolicy};
use racescan::date::{find_date, strip_leading_date};
use racescan::engine::{UNKNOWN_DATE_LABEL, assemble, extract_records, scan_candidates};
use racescan::fields::extract_fields;
use racescan::lines::{LineSequence, normalize};
use racescan::model::{CandidateEvent, DateToken, Month};
use racescan::name::resolve_name;

fn sequence(lines: &[&str]) -> LineSequence {
    normalize(&lines.join("\n"))
}

#[test]
fn normalize_collapses_whitespace_and_drops_empty_lines() {
    let lines = normalize("  Maple   Leaf\tClassic  \n\n   \nRace Distance:  10K\n");

    assert_eq!(lines.len(), 2);
    assert_eq!(&lines[0], "Maple Leaf Classic");
    assert_eq!(&lines[1], "Race Distance: 10K");
}

#[test]
fn normalize_of_empty_input_is_empty() {
    assert!(normalize("").is_empty());
    assert!(normalize("   \n \t \n").is_empty());
}

#[test]
fn date_day_before_month_wins_over_month_before_day() {
    let lines = sequence(&["03 may and later May 17"]);
    let token = find_date(&lines, 0, 30).expect("date expected");

    assert_eq!(token.month, Month::May);
    assert_eq!(token.day, 3);
    assert_eq!(token.to_string(), "MAY 03");
}

#[test]
fn date_accepts_long_month_spellings() {
    for (text, month) in [
        ("7 september", Month::Sep),
        ("7 sept", Month::Sep),
        ("7 sep", Month::Sep),
        ("october 7", Month::Oct),
        ("November 8, 2026", Month::Nov),
    ] {
        let lines = sequence(&[text]);
        let token = find_date(&lines, 0, 30).expect("date expected");
        assert_eq!(token.month, month, "input {text:?}");
        assert_eq!(token.day, if month == Month::Nov { 8 } else { 7 });
    }
}

#[test]
fn date_ignores_non_month_words_next_to_numbers() {
    let lines = sequence(&["10 runners joined 12 teams"]);
    assert!(find_date(&lines, 0, 30).is_none());
}

#[test]
fn date_nearest_preceding_line_wins() {
    let lines = sequence(&["12 jun", "05 jul", "no date here"]);
    let token = find_date(&lines, 2, 30).expect("date expected");

    assert_eq!(token.to_string(), "JUL 05");
}

#[test]
fn date_lookback_window_is_inclusive_at_its_edge() {
    let mut rows = vec!["03 may"];
    rows.extend(std::iter::repeat_n("filler line", 5));
    let lines = sequence(&rows);

    // Date sits exactly 5 lines back from the anchor.
    assert!(find_date(&lines, 5, 5).is_some());
    assert!(find_date(&lines, 5, 4).is_none());
}

#[test]
fn date_unknown_when_window_is_empty() {
    let lines = sequence(&["nothing", "to", "see"]);
    assert!(find_date(&lines, 2, 30).is_none());
}

#[test]
fn strip_leading_date_requires_a_real_month() {
    assert_eq!(strip_leading_date("03 may Some 10K Race"), "Some 10K Race");
    assert_eq!(strip_leading_date("May 3, Maple Run"), "Maple Run");
    assert_eq!(strip_leading_date("10 runners strong"), "10 runners strong");
}

#[test]
fn fields_extracts_distances_states_and_time() {
    let config = EngineConfig::default();
    let fields = extract_fields(
        "9:00 am Race Distance: 10K, 5K State: Vermont, New Hampshire",
        &config,
    );

    assert_eq!(fields.distances, vec!["10K", "5K"]);
    assert!(fields.distance_eligible);
    assert_eq!(fields.states, vec!["Vermont", "New Hampshire"]);
    assert_eq!(fields.start_time.as_deref(), Some("9:00 am"));
    assert_eq!(fields.time_spans.len(), 1);
}

#[test]
fn fields_missing_labels_yield_empty_fields() {
    let config = EngineConfig::default();
    let fields = extract_fields("just a stray line of prose", &config);

    assert!(fields.distances.is_empty());
    assert!(!fields.distance_eligible);
    assert!(fields.states.is_empty());
    assert!(fields.start_time.is_none());
}

#[test]
fn fields_unsplit_distance_list_is_still_eligible() {
    let config = EngineConfig::default();
    let fields = extract_fields("Race Distance: 5K 10K Half State: Vermont", &config);

    assert_eq!(fields.distances, vec!["5K 10K Half"]);
    assert!(fields.distance_eligible);
}

#[test]
fn fields_distance_without_eligible_token_is_not_eligible() {
    let config = EngineConfig::default();
    let fields = extract_fields("Race Distance: 5K, Half Marathon State: Vermont", &config);

    assert!(!fields.distance_eligible);
}

#[test]
fn fields_states_split_on_pipe_and_slash() {
    let config = EngineConfig::default();

    let piped = extract_fields("Race Distance: 10K State: vermont|new hampshire", &config);
    assert_eq!(piped.states, vec!["Vermont", "New Hampshire"]);

    let slashed = extract_fields("Race Distance: 10K State: Vermont / Maine", &config);
    assert_eq!(slashed.states, vec!["Vermont"]);
}

#[test]
fn fields_state_substring_fallback_handles_run_together_lists() {
    let config = EngineConfig::default();
    let fields = extract_fields(
        "Race Distance: 10K State: VermontNew Hampshire",
        &config,
    );

    // No exact token matches; the unsplit blob still names both states.
    assert_eq!(fields.states, vec!["New Hampshire", "Vermont"]);
}

#[test]
fn fields_unmatched_state_contributes_nothing() {
    let config = EngineConfig::default();
    let fields = extract_fields("Race Distance: 10K State: Narnia", &config);
    assert!(fields.states.is_empty());
}

#[test]
fn name_between_two_time_tokens() {
    let config = EngineConfig::default();
    let lines = sequence(&["Race Distance: 10K 9:00 am - Fun Run - 10:30 am State: Vermont"]);
    let fields = extract_fields(&lines[0], &config);

    assert_eq!(fields.time_spans.len(), 2);
    assert_eq!(resolve_name(&lines, 0, &fields, &config), "Fun Run");
}

#[test]
fn name_after_single_time_token_truncates_at_director() {
    let config = EngineConfig::default();
    let lines =
        sequence(&["Race Distance: 10K 9:00 am Moose Trot Race Director: Pat State: Vermont"]);
    let fields = extract_fields(&lines[0], &config);

    assert_eq!(resolve_name(&lines, 0, &fields, &config), "Moose Trot");
}

#[test]
fn name_backward_window_picks_nearest_title_like_line() {
    let config = EngineConfig::default();
    let lines = sequence(&[
        "Vermont Summer Run",
        "Race Type: Trail",
        "Race Distance: 10K State: Vermont",
    ]);
    let fields = extract_fields(&lines[2], &config);

    // The type row is a label line and never a title.
    assert_eq!(
        resolve_name(&lines, 2, &fields, &config),
        "Vermont Summer Run"
    );
}

#[test]
fn name_backward_window_is_bounded() {
    let mut config = EngineConfig::default();
    config.name_lookback = 2;

    let lines = sequence(&[
        "Out Of Window Title",
        "xx",
        "yy",
        "Race Distance: 10K State: Vermont",
    ]);
    let fields = extract_fields(&lines[3], &config);

    // Only the two short lines are in the window, so the anchor's own text
    // is the fallback, and it is empty before the first label.
    assert_eq!(
        resolve_name(&lines, 3, &fields, &config),
        "Race Distance: 10K State: Vermont"
    );
}

#[test]
fn name_anchor_fallback_strips_date_and_labels() {
    let config = EngineConfig::default();
    let lines = sequence(&["03 may Some 10K Race Race Distance: 10K, 5K State: Vermont"]);
    let fields = extract_fields(&lines[0], &config);

    assert_eq!(resolve_name(&lines, 0, &fields, &config), "Some 10K Race");
}

#[test]
fn scenario_one_inline_record() {
    let config = EngineConfig::default();
    let lines = sequence(&["03 may Some 10K Race Race Distance: 10K, 5K State: Vermont"]);
    let records = extract_records(&lines, &config);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].date, "MAY 03");
    assert_eq!(records[0].state, "Vermont");
    assert_eq!(records[0].race_name, "Some 10K Race");
    assert_eq!(records[0].distances, "10K, 5K");
}

#[test]
fn scenario_two_title_and_date_from_lookback() {
    let config = EngineConfig::default();
    let lines = sequence(&[
        "12 jun",
        "Vermont Summer Run",
        "Race Distance: 10K State: Vermont",
    ]);
    let records = extract_records(&lines, &config);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].date, "JUN 12");
    assert_eq!(records[0].race_name, "Vermont Summer Run");
}

#[test]
fn scenario_three_two_states_yield_two_records() {
    let config = EngineConfig::default();
    let lines = sequence(&[
        "12 jun",
        "Border Dash",
        "Race Distance: 10K State: Vermont, New Hampshire",
    ]);
    let records = extract_records(&lines, &config);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].state, "Vermont");
    assert_eq!(records[1].state, "New Hampshire");
    assert_eq!(records[0].date, records[1].date);
    assert_eq!(records[0].race_name, records[1].race_name);
}

#[test]
fn scenario_four_month_outside_window_is_dropped() {
    let config = EngineConfig::default();
    let lines = sequence(&[
        "november 8",
        "Turkey Trot",
        "Race Distance: 10K State: Vermont",
    ]);

    assert!(extract_records(&lines, &config).is_empty());
}

#[test]
fn scenario_five_duplicate_lines_collapse_to_one_record() {
    let config = EngineConfig::default();
    let lines = sequence(&[
        "03 may Some 10K Race Race Distance: 10K, 5K State: Vermont",
        "03 may Some 10K Race Race Distance: 10K, 5K State: Vermont",
    ]);
    let records = extract_records(&lines, &config);

    assert_eq!(records.len(), 1);
}

#[test]
fn unknown_date_keep_policy_tags_the_record() {
    let mut config = EngineConfig::default();
    config.unknown_date = UnknownDatePolicy::Keep;

    let lines = sequence(&["Foggy Run", "Race Distance: 10K State: Vermont"]);
    let records = extract_records(&lines, &config);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].date, UNKNOWN_DATE_LABEL);
}

#[test]
fn unknown_date_drop_policy_discards_the_candidate() {
    let mut config = EngineConfig::default();
    config.unknown_date = UnknownDatePolicy::Drop;

    let lines = sequence(&["Foggy Run", "Race Distance: 10K State: Vermont"]);
    assert!(extract_records(&lines, &config).is_empty());
}

#[test]
fn candidates_without_states_produce_no_records() {
    let config = EngineConfig::default();
    let lines = sequence(&["12 jun", "Race Distance: 10K State: Quebec"]);
    let candidates = scan_candidates(&lines, &config);

    assert_eq!(candidates.len(), 1);
    assert!(assemble(&candidates, &config).is_empty());
}

#[test]
fn assemble_judges_eligibility_on_the_distance_list_not_the_raw_line() {
    let config = EngineConfig::default();

    // The token appears on the line outside the distance span; only the
    // extracted distance list counts.
    let candidate = CandidateEvent {
        date: Some(DateToken {
            month: Month::Jun,
            day: 12,
        }),
        distances: vec!["5K".to_string(), "Half Marathon".to_string()],
        states: vec!["Vermont".to_string()],
        start_time: None,
        race_name: "Border Dash".to_string(),
        raw_line: "Border Dash 10K series Race Distance: 5K, Half Marathon State: Vermont"
            .to_string(),
        source_index: 0,
    };

    assert!(assemble(&[candidate], &config).is_empty());
}

#[test]
fn extraction_is_idempotent_and_order_preserving() {
    let config = EngineConfig::default();
    let lines = sequence(&[
        "03 may",
        "Maple Leaf Classic",
        "Race Distance: 10K, 5K State: Vermont",
        "12 jun",
        "Border Dash",
        "Race Distance: 10K State: New Hampshire, Vermont",
    ]);

    let first = extract_records(&lines, &config);
    let second = extract_records(&lines, &config);

    assert_eq!(first, second);
    assert_eq!(
        first
            .iter()
            .map(|r| r.race_name.as_str())
            .collect::<Vec<_>>(),
        ["Maple Leaf Classic", "Border Dash", "Border Dash"]
    );

    let mut keys = first.iter().map(|r| r.dedup_key()).collect::<Vec<_>>();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), first.len());
}
