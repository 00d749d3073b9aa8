use holey::{Holey, Value};
use proptest::prelude::*;

fn words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z]{1,8}", 1..6)
}

proptest! {
    #[test]
    fn text_without_holes_is_copied(input in "[^{\r]*") {
        let template = holey::parse(&input).unwrap();
        prop_assert_eq!(template.to_string(), input.clone());
        prop_assert_eq!(holey::parse(&template.to_string()).unwrap(), template.clone());

        let lines = Holey::new()
            .render_properties(&template, Vec::<(String, Value)>::new())
            .unwrap();
        prop_assert_eq!(lines, input.split('\n').map(str::to_string).collect::<Vec<_>>());
    }

    #[test]
    fn split_then_join_restores_words(words in words()) {
        let holey = Holey::new();
        let template = holey.parse("{text | split(' ') | join(' ')}").unwrap();

        let lines = holey
            .render_properties(&template, vec![("text", words.join(" "))])
            .unwrap();
        prop_assert_eq!(lines, vec![words.join(" ")]);
    }

    #[test]
    fn take_never_exceeds_count(text in "[a-zA-Zæøå ]{0,20}", count in 0i64..30) {
        let holey = Holey::new();
        let template = holey.parse(&format!("{{take(text, {})}}", count)).unwrap();

        let lines = holey.render_properties(&template, vec![("text", text.clone())]).unwrap();
        let expected: String = text.chars().take(count as usize).collect();
        if expected.is_empty() {
            prop_assert_eq!(&lines[0], "<empty>");
        } else {
            prop_assert_eq!(&lines[0], &expected);
            prop_assert!(lines[0].chars().count() <= count as usize);
        }
    }

    #[test]
    fn names_ignore_case(name in "[a-z][a-zA-Z]{0,10}", flip in any::<bool>()) {
        let holey = Holey::new();
        let lookup = if flip { name.to_uppercase() } else { name.to_lowercase() };
        let template = holey.parse(&format!("{{{} | UPPER}}", lookup)).unwrap();

        let lines = holey.render_properties(&template, vec![(name, "value")]).unwrap();
        prop_assert_eq!(lines, vec!["VALUE".to_string()]);
    }
}

proptest! {
    #[test]
    fn holes_reparse_to_the_same_tree(name in "[a-zA-Z][a-zA-Z0-9]{0,6}", count in 0i64..9) {
        let source = format!("a {{{} | take({}) | upper}} b", name, count);
        let template = holey::parse(&source).unwrap();
        prop_assert_eq!(template.to_string(), source);
    }
}
