use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "Bouncy",
    "Wobbly",
    "Fluffy",
    "Sparkly",
    "Giggly",
    "Wiggly",
    "Bubbly",
    "Fuzzy",
    "Silly",
    "Zippy",
    "Loopy",
    "Squishy",
];

const NOUNS: &[&str] = &[
    "Penguin",
    "Banana",
    "Noodle",
    "Pickle",
    "Unicorn",
    "Muffin",
    "Potato",
    "Panda",
    "Cupcake",
    "Doodle",
    "Waffle",
    "Marshmallow",
];

/// Display name for a new session, a random adjective/noun pair. Two sessions
/// may end up with the same name; names are labels, not identities.
pub fn generate_display_name() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "{}{}",
        ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())],
        NOUNS[rng.gen_range(0..NOUNS.len())]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_composes_an_adjective_noun_pair() {
        for _ in 0..32 {
            let name = generate_display_name();
            let adjective = ADJECTIVES
                .iter()
                .find(|a| name.starts_with(*a))
                .expect("name starts with a known adjective");
            assert!(NOUNS.contains(&&name[adjective.len()..]));
        }
    }
}
