use proptest::prelude::*;
use step_form_util::{change_casing, split_words, CasingType};

fn arb_identifier() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_-]{0,24}"
}

proptest! {
    #[test]
    fn snake_and_kebab_are_lowercase(name in arb_identifier()) {
        let snake = change_casing(&name, CasingType::Snake);
        let kebab = change_casing(&name, CasingType::Kebab);
        prop_assert_eq!(snake.to_lowercase(), snake.clone());
        prop_assert_eq!(kebab.replace('-', "_"), snake);
    }

    #[test]
    fn title_keeps_word_count(name in arb_identifier()) {
        let words = split_words(&name);
        let title = change_casing(&name, CasingType::Title);
        prop_assert_eq!(title.split_whitespace().count(), words.len());
    }

    #[test]
    fn flat_is_concatenated_words(name in arb_identifier()) {
        prop_assert_eq!(change_casing(&name, CasingType::Flat), split_words(&name).concat());
    }
}

#[test]
fn title_is_default_label_casing() {
    assert_eq!(change_casing("firstName", CasingType::default()), "First Name");
}
