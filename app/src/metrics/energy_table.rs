/// Normalized per-language energy consumption constants (joules), from the
/// SLE'17 "Energy Efficiency across Programming Languages" benchmark set.
/// Languages missing here carry no energy weight of their own.
pub const LANGUAGE_ENERGY_JOULES: &[(&str, f64)] = &[
    ("C", 1.00),
    ("Rust", 1.03),
    ("C++", 1.34),
    ("Ada", 1.70),
    ("Java", 1.98),
    ("Pascal", 2.14),
    ("Chapel", 2.18),
    ("Lisp", 2.27),
    ("OCaml", 2.40),
    ("Fortran", 2.52),
    ("Swift", 2.79),
    ("Haskell", 3.10),
    ("C#", 3.14),
    ("Go", 3.23),
    ("Dart", 3.83),
    ("F#", 4.13),
    ("JavaScript", 4.45),
    ("Racket", 7.91),
    ("TypeScript", 21.50),
    ("Hack", 24.02),
    ("PHP", 29.30),
    ("Erlang", 42.23),
    ("Lua", 45.98),
    ("JRuby", 46.54),
    ("Ruby", 69.91),
    ("Python", 75.88),
    ("Perl", 79.58),
];
