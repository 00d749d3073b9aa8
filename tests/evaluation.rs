use holey::{Error, Holey, Members, Model, Position};
use rstest::rstest;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Sends engine logs to the test output. Set `RUST_LOG=holey=trace` to see them.
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .init();
    });
}

struct Person {
    first_name: String,
    last_name: String,
}

impl Person {
    fn new(first_name: &str, last_name: &str) -> Self {
        Person {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        }
    }
}

impl Model for Person {
    fn members(members: &mut Members<Self>) {
        members
            .member("FirstName", |p: &Person| p.first_name.clone())
            .member("LastName", |p: &Person| p.last_name.clone());
    }
}

fn render(template: &str, person: &Person) -> Result<Vec<String>, Error> {
    init_tracing();
    let holey = Holey::new();
    let template = holey
        .parse(template)
        .unwrap_or_else(|e| panic!("parsing {:?} failed: {}", template, e));
    holey.render_model(&template, person)
}

#[rstest]
#[case("{firstName | split(' ') | substr(1) | join('') | lower}{lastName | split(' ') | substr(1) | join('') | lower}", "tok")]
#[case("{firstName | split(' ') | reverse | substr(1) | join('') | lower}{lastName | split(' ') | substr(1) | join('') | lower}", "otk")]
#[case("{firstName | split(' ') | join('.') | lower}.{lastName | split(' ') | join('.') | lower}", "tore.olav.kristiansen")]
#[case("{firstName | split(' ') | skip(1) | join('') | lower}.{lastName | split(' ') | join('.') | lower}", "olav.kristiansen")]
#[case("{firstName | split(' ') | take(1) | upper}{lastName | take(1) | upper}", "TOREK")]
#[case("{firstName | substr(2) | lower}{lastName | substr(1) | lower}", "tok")]
#[case("{lower(take(firstName, 4))}", "tore")]
#[case("{truncate(lastName, 5)}", "Krist")]
#[case("{'x' | upper}{42}", "X42")]
#[case("{firstName | split('') | join('.')}", "Tore.Olav")]
fn evaluation_outputs_correct_result(#[case] template: &str, #[case] expected: &str) {
    let lines = render(template, &Person::new("Tore Olav", "Kristiansen")).unwrap();
    assert_eq!(lines, vec![expected]);
}

#[test]
fn replace_outputs_correct_result() {
    let lines = render("{lastName | replace('ø', 'o')}", &Person::new("Peder", "Kjøs")).unwrap();
    assert_eq!(lines[0].to_lowercase(), "kjos");
}

#[rstest]
#[case("{firstName}\n{firstName}\r\n{firstName}", "tore olav")]
#[case("hello\nhello\r\nhello", "hello")]
fn multi_line_evaluation(#[case] template: &str, #[case] expected: &str) {
    let lines = render(template, &Person::new("Tore Olav", "Kristiansen")).unwrap();
    assert_eq!(lines.len(), 3);
    for line in lines {
        assert_eq!(line.to_lowercase(), expected);
    }
}

#[test]
fn multi_line_parse_error_position() {
    let err = holey::parse("{firstName}\n{firstName}\r\n{").unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(err.position(), Position::new(26, 3, 2));
    assert_eq!(
        err.caret("{firstName}\n{firstName}\r\n{").as_deref(),
        Some("{\n ^")
    );
}

#[rstest]
#[case("{firstName | split}", "An error occurred while calling function 'split': Parameter count mismatch.")]
#[case("{firstName | blah}", "Unknown function 'blah'. Available functions: split, join, skip, take, substr, replace, reverse, upper, lower, trim, truncate")]
#[case("{firstName | 2}", "Unknown function '2'. Available functions: split, join, skip, take, substr, replace, reverse, upper, lower, trim, truncate")]
#[case("{substr(2, 2)}", "An error occurred while calling function 'substr': Specified method is not supported.")]
#[case("{unknown}", "Unknown property 'unknown'. Available properties: FirstName, LastName")]
fn evaluation_outputs_correct_error_message(#[case] template: &str, #[case] expected: &str) {
    let err = render(template, &Person::new("Tore Olav", "Kristiansen")).unwrap_err();
    assert_eq!(err.to_string(), expected);
}

#[test]
fn special_characters_outside_holes() {
    let template = holey::parse("Hello {name}, this is a | (pipe)").unwrap();
    assert_eq!(template.to_string(), "Hello {name}, this is a | (pipe)");

    let lines = Holey::new()
        .render_properties(&template, vec![("name", "you")])
        .unwrap();
    assert_eq!(lines, vec!["Hello you, this is a | (pipe)"]);
}

#[test]
fn lines_are_evaluated_lazily() {
    let holey = Holey::new();
    let template = holey.parse("{firstName}\n{missing}\n{lastName}").unwrap();
    let person = Person::new("Tore Olav", "Kristiansen");

    let mut lines = holey.evaluate_model(&template, &person);
    assert_eq!(lines.next(), Some(Ok("Tore Olav".to_string())));
    assert!(matches!(
        lines.next(),
        Some(Err(Error::UnknownProperty { .. }))
    ));
    assert_eq!(lines.next(), None);
}

#[test]
fn null_and_empty_placeholders() {
    let holey = Holey::new();
    let template = holey.parse("[{a}] [{b}] [{c | split(',')}]").unwrap();

    let lines = holey
        .render_properties(
            &template,
            vec![
                ("a", holey::Value::Null),
                ("b", holey::Value::from("")),
                ("c", holey::Value::from(" , ")),
            ],
        )
        .unwrap();
    assert_eq!(lines, vec!["[<null>] [<empty>] [<empty>]"]);
}

#[test]
fn null_inside_json_array() {
    let holey = Holey::new();
    let template = holey.parse("{items}").unwrap();

    let lines = holey
        .render_json(&template, serde_json::json!({ "items": ["a", null] }))
        .unwrap();
    assert_eq!(lines, vec!["a <null>"]);
}

#[test]
fn one_engine_many_threads() {
    let holey = Holey::new();
    let template = holey
        .parse("{firstName | split(' ') | take(1) | upper}{lastName | take(1) | upper}")
        .unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = ["Tore Olav", "Ada", "Linus Benedict"]
            .into_iter()
            .map(|first_name| {
                let holey = &holey;
                let template = &template;
                scope.spawn(move || {
                    holey
                        .render_model(template, &Person::new(first_name, "Kristiansen"))
                        .unwrap()
                })
            })
            .collect();

        let lines: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().remove(0))
            .collect();
        assert_eq!(lines, vec!["TOREK", "ADAK", "LINUSK"]);
    });
}
