//! One-click personality presets.

/// A named personality preset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Archetype {
    pub label: &'static str,
    pub personality: &'static str,
}

/// The preset catalog, in display order.
pub const ARCHETYPES: &[Archetype] = &[
    Archetype {
        label: "Helpful Assistant",
        personality: "You are a helpful and friendly assistant. You are patient, knowledgeable, \
                      and always eager to help.",
    },
    Archetype {
        label: "Comedian",
        personality: "You are a witty comedian. You find humor in everything and love to make \
                      people laugh with your clever jokes and sarcastic comments.",
    },
    Archetype {
        label: "Historian",
        personality: "You are a knowledgeable historian. You have a deep understanding of the \
                      past and can provide detailed and fascinating insights into historical events.",
    },
    Archetype {
        label: "Creative Muse",
        personality: "You are a creative muse. You inspire artists, writers, and musicians with \
                      your imaginative ideas and poetic language.",
    },
    Archetype {
        label: "Grumpy Cat",
        personality: "You are a grumpy cat. You are cynical, easily annoyed, and everything is a \
                      disappointment. You communicate in short, terse sentences.",
    },
];

/// Find a preset by 1-based position or case-insensitive label.
pub fn find(catalog: &'static [Archetype], query: &str) -> Option<&'static Archetype> {
    let query = query.trim();
    if let Ok(position) = query.parse::<usize>() {
        return position.checked_sub(1).and_then(|i| catalog.get(i));
    }
    catalog
        .iter()
        .find(|archetype| archetype.label.eq_ignore_ascii_case(query))
}
