// Test fixtures with known manuscripts and expected sentence tables
// WHY: Golden-table testing requires deterministic input/output pairs for validation

#![allow(dead_code)]

/// Prose with typographic quotes, wrapped lines and a paragraph break
pub const PROSE_TEXT: &str = "Once when I was six years old I saw a magnificent picture.\n\n\
He said, \u{201C}Draw me a sheep!\u{201D} I was astounded.\n\
\u{201C}What?\u{201D}\n\
\u{201C}Draw me\n   a sheep\u{2026}\u{201D}";

/// Expected table for PROSE_TEXT straight from segmentation
pub const PROSE_SEGMENTS: &[(&str, &str)] = &[
    ("NARRATOR", "Once when I was six years old I saw a magnificent picture. He said,"),
    ("DIALOGUE", "Draw me a sheep!"),
    ("NARRATOR", "I was astounded."),
    ("DIALOGUE", "What?"),
    ("DIALOGUE", "Draw me a sheep\u{2026}"),
];

/// Curated character map for PROSE_TEXT
pub const PROSE_CHARACTERS: &str = r#"{"Little Prince": [2, 5], "Pilot": [4]}"#;

/// Expected table for PROSE_TEXT after merging PROSE_CHARACTERS
pub const PROSE_MERGED: &[(&str, &str)] = &[
    ("NARRATOR", "Once when I was six years old I saw a magnificent picture. He said,"),
    ("LITTLE_PRINCE", "Draw me a sheep!"),
    ("NARRATOR", "I was astounded."),
    ("PILOT", "What?"),
    ("LITTLE_PRINCE", "Draw me a sheep\u{2026}"),
];

/// Script with label lines, stage directions and an unknown label
pub const SCRIPT_TEXT: &str = "A country road. A tree.\n\
Evening.\n\
\n\
VLADIMIR:\n\
Nothing to be done.\n\
\n\
ESTRAGON:\n\
I'm beginning to come round\n\
to that opinion.\n\
GODOT:\n\
Silence.\n\
  POZZO:  \n\
I present myself: Pozzo.\n";

pub const SCRIPT_LABELS: &[&str] = &["VLADIMIR", "ESTRAGON", "POZZO", "LUCKY", "BOY"];

/// Expected table for SCRIPT_TEXT
pub const SCRIPT_SEGMENTS: &[(&str, &str)] = &[
    ("NARRATOR", "A country road. A tree. Evening."),
    ("VLADIMIR", "Nothing to be done."),
    ("ESTRAGON", "I'm beginning to come round to that opinion. GODOT: Silence."),
    ("POZZO", "I present myself: Pozzo."),
];

/// Prose whose closing quote is missing
pub const UNBALANCED_TEXT: &str = "She began, \"and never stopped talking.";

pub const UNBALANCED_SEGMENTS: &[(&str, &str)] = &[
    ("NARRATOR", "She began,"),
    ("NARRATOR", "and never stopped talking."),
];
