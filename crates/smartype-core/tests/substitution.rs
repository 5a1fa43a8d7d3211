use smartype_core::{
    compile, deserialize, serialize, BufferField, CaretMatcher, CompiledRule, Disposable,
    PreferenceHub, RawSubstitutionRule, RuleCache, SubstitutionSession, TextField,
};
use std::rc::Rc;
use std::sync::Arc;

fn rules(pairs: &[(&str, &str)], smart_quotes: bool, smart_dashes: bool) -> Arc<[CompiledRule]> {
    let raw: Vec<_> = pairs
        .iter()
        .map(|(from, to)| RawSubstitutionRule::new(*from, *to))
        .collect();
    compile(&raw, smart_quotes, smart_dashes).into()
}

fn field_with(value: &str, rules: Arc<[CompiledRule]>) -> (BufferField, SubstitutionSession) {
    let field = BufferField::with_value(value);
    let session = SubstitutionSession::attach(&field, rules).unwrap();
    (field, session)
}

#[test]
fn replaces_text_after_an_input_event() {
    let (mut field, _session) = field_with("something, something", rules(&[("shrug", "¯\\_(ツ)_/¯")], false, false));

    field.input_text(" shrug ");
    assert_eq!(field.value(), "something, something ¯\\_(ツ)_/¯ ");
}

#[test]
fn stops_replacing_once_disposed() {
    let (mut field, mut session) =
        field_with("everything I do deserves… ", rules(&[("disapproval", "ಠ_ಠ")], false, false));

    field.input_text("disapproval ");
    assert_eq!(field.value(), "everything I do deserves… ಠ_ಠ ");

    session.dispose();
    session.dispose();
    field.input_text("and more disapproval.");
    assert_eq!(field.value(), "everything I do deserves… ಠ_ಠ and more disapproval.");
}

#[test]
fn handles_multiple_substitutions() {
    let (mut field, _session) = field_with(
        "",
        rules(&[("disapproval", "ಠ_ಠ"), ("shrug", "¯\\_(ツ)_/¯")], false, false),
    );

    field.input_text("here is a shrug,");
    assert_eq!(field.value(), "here is a ¯\\_(ツ)_/¯,");

    field.input_text(" and a gaze of disapproval.");
    assert_eq!(field.value(), "here is a ¯\\_(ツ)_/¯, and a gaze of ಠ_ಠ.");
}

#[test]
fn only_substitutes_the_word_before_the_caret() {
    let (mut field, _session) = field_with("", rules(&[("shrug", "¯\\_(ツ)_/¯")], false, false));

    field.input_text("multiple shrug shrug shrug ");
    assert_eq!(field.value(), "multiple shrug shrug ¯\\_(ツ)_/¯ ");
}

#[test]
fn handles_symbol_triggers_while_typing() {
    let (mut field, _session) = field_with(
        "",
        rules(
            &[
                ("(tm)", "\u{2122}"),
                ("....", "\u{2026}"),
                ("->", "\u{2192}"),
                ("<-", "\u{2190}"),
                ("(1/2)", "\u{00bd}"),
                ("(c)", "\u{00a9}"),
                ("(1/4)", "\u{00bc}"),
                ("(r)", "\u{00ae}"),
                ("(3/4)", "\u{00be}"),
                ("(2/3)", "\u{2154}"),
                ("(1/3)", "\u{2153}"),
            ],
            false,
            true,
        ),
    );

    field.type_text("Hello (c) . look here -> or there <- (1/2) is less than (3/4) (r) .... (1/3) (tm)... ");
    assert_eq!(field.value(), "Hello © . look here → or there ← ½ is less than ¾ ® … ⅓ ™… ");
}

#[test]
fn overlapping_arrow_triggers() {
    let (mut field, _session) = field_with(
        "",
        rules(&[("->", "→"), ("<-", "←"), ("|->", "↳"), ("<-|", "↵")], false, false),
    );

    field.type_text("<-| is ←|, |-> is |→");
    assert_eq!(field.value(), "↵ is ←|, ↳ is |→");
}

#[test]
fn replaces_quotes_and_dashes_when_enabled() {
    let (mut field, _session) = field_with("", rules(&[], true, true));

    field.type_text("'This is a single quote,' she said--- \"And this is a double\" ");
    assert_eq!(
        field.value(),
        "‘This is a single quote,’ she said— “And this is a double” "
    );
}

#[test]
fn smart_punctuation_is_applied_inside_replacements() {
    let greeting = [("greetings", "Hello-- my name is 'Milo,' how do you do?")];

    let (mut field, mut session) = field_with("", rules(&greeting, false, false));
    field.input_text("greetings ");
    assert_eq!(field.value(), "Hello-- my name is 'Milo,' how do you do? ");
    session.dispose();
    field.clear();

    let _session = SubstitutionSession::attach(&field, rules(&greeting, true, true)).unwrap();
    field.input_text("greetings ");
    assert_eq!(field.value(), "Hello— my name is ‘Milo,’ how do you do? ");
}

#[test]
fn literal_scenarios() {
    let (mut field, _session) = field_with("", rules(&[], false, true));
    field.input_text("she said--- ");
    assert_eq!(field.value(), "she said— ");

    let (mut field, _session) = field_with("", rules(&[], true, false));
    field.type_text("'This is a quote,' ");
    assert_eq!(field.value(), "‘This is a quote,’ ");

    let (mut field, _session) = field_with("", rules(&[("(tm)", "™")], false, false));
    field.input_text("Big(tm) ");
    assert_eq!(field.value(), "Big™ ");
}

#[test]
fn waits_for_the_word_to_end() {
    let (mut field, _session) = field_with("", rules(&[("omw", "On my way!")], false, false));

    field.type_text("omw");
    assert_eq!(field.value(), "omw");
    field.type_text("s ");
    assert_eq!(field.value(), "omws ");
}

#[test]
fn longer_triggers_win() {
    let (mut field, _session) = field_with(
        "",
        rules(&[("approval", "👍"), ("disapproval", "ಠ_ಠ")], false, false),
    );

    field.type_text("disapproval approval ");
    assert_eq!(field.value(), "ಠ_ಠ 👍 ");
}

#[test]
fn disabled_rules_are_ignored() {
    let raw = [
        RawSubstitutionRule::new("omw", "On my way!").disabled(),
        RawSubstitutionRule::new("brb", "Be right back"),
    ];
    let (mut field, _session) = field_with("", compile(&raw, false, false).into());

    field.type_text("omw brb ");
    assert_eq!(field.value(), "omw Be right back ");
}

#[test]
fn paste_and_undo_do_not_substitute() {
    let (mut field, _session) = field_with("", rules(&[("omw", "On my way!")], false, false));

    field.type_text("omw");
    field.paste(" ");
    assert_eq!(field.value(), "omw ");

    field.clear();
    field.type_text("omw ");
    assert_eq!(field.value(), "On my way! ");
    assert!(field.undo());
    assert_eq!(field.value(), "omw ");

    // typing resumes normally after the undo
    field.type_text("omw ");
    assert_eq!(field.value(), "omw On my way! ");
}

#[test]
fn backspace_does_not_substitute() {
    let (mut field, _session) = field_with("", rules(&[("omw", "On my way!")], false, false));

    field.input_text("omw  ");
    assert_eq!(field.value(), "On my way!  ");
    field.clear();

    field.type_text("omw");
    field.input_text(" x");
    assert_eq!(field.value(), "omw x");
    field.backspace();
    assert_eq!(field.value(), "omw ");
}

#[test]
fn rules_survive_serialization() {
    let original = rules(&[("<-|", "↵"), ("<-", "←"), ("shrug", "¯\\_(ツ)_/¯")], true, true);
    let revived: Arc<[CompiledRule]> = deserialize(&serialize(&original).unwrap()).unwrap().into();

    for compiled in [original, revived] {
        let matcher = Rc::new(CaretMatcher::new(compiled));
        let mut field = BufferField::new();
        let _subscription = smartype_core::attach(&field, matcher).unwrap();

        field.type_text("<-| shrug 'ok' ");
        assert_eq!(field.value(), "↵ ¯\\_(ツ)_/¯ ‘ok’ ");
    }
}

#[test]
fn hub_notification_reaches_a_subscribed_session() {
    let hub = PreferenceHub::shared();
    let mut cache = RuleCache::new();
    let (mut field, mut session) = field_with("", rules(&[("omw", "On my way")], false, false));
    let updates = session.subscribe(&hub).unwrap();
    assert_eq!(hub.lock().unwrap().len(), 1);

    let payload = serialize(&rules(&[("brb", "Be right back")], false, false)).unwrap();
    assert_eq!(PreferenceHub::notify(&hub, &payload).unwrap(), 1);
    assert!(session.poll_updates(&updates, &mut cache).unwrap());

    field.type_text("omw brb ");
    assert_eq!(field.value(), "omw Be right back ");

    session.dispose();
    assert!(hub.lock().unwrap().is_empty());
    assert_eq!(PreferenceHub::notify(&hub, &payload).unwrap(), 0);
}
