//! Dialect descriptors.
//!
//! A [`Syntax`] is plain data: which meta-characters and escapes the parser
//! recognizes, how it treats a few ambiguous constructs, and which options
//! are on by default. Presets cover the common dialects.

use bitflags::bitflags;

use crate::options::Options;

bitflags! {
    /// Operator categories recognized by the parser.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SyntaxOperators: u64 {
        const DOT_ANYCHAR                  = 1 << 0;
        const ASTERISK_ZERO_INF            = 1 << 1;
        const ESC_ASTERISK_ZERO_INF        = 1 << 2;
        const PLUS_ONE_INF                 = 1 << 3;
        const ESC_PLUS_ONE_INF             = 1 << 4;
        const QMARK_ZERO_ONE               = 1 << 5;
        const ESC_QMARK_ZERO_ONE           = 1 << 6;
        const BRACE_INTERVAL               = 1 << 7;
        const ESC_BRACE_INTERVAL           = 1 << 8;
        const VBAR_ALT                     = 1 << 9;
        const ESC_VBAR_ALT                 = 1 << 10;
        const LPAREN_SUBEXP                = 1 << 11;
        const ESC_LPAREN_SUBEXP            = 1 << 12;
        /// `\A`, `\Z`, `\z`
        const ESC_AZ_BUF_ANCHOR            = 1 << 13;
        /// `\G`
        const ESC_CAPITAL_G_BEGIN_ANCHOR   = 1 << 14;
        /// `\1` .. `\9` and beyond
        const DECIMAL_BACKREF              = 1 << 15;
        const BRACKET_CC                   = 1 << 16;
        const ESC_W_WORD                   = 1 << 17;
        /// GNU `\<` and `\>`
        const ESC_LTGT_WORD_BEGIN_END      = 1 << 18;
        const ESC_B_WORD_BOUND             = 1 << 19;
        const ESC_S_WHITE_SPACE            = 1 << 20;
        const ESC_D_DIGIT                  = 1 << 21;
        /// `^` and `$`
        const LINE_ANCHOR                  = 1 << 22;
        /// `[:alpha:]` inside a bracket class
        const POSIX_BRACKET                = 1 << 23;
        const QMARK_NON_GREEDY             = 1 << 24;
        /// `\t \n \r \f \a \e`
        const ESC_CONTROL_CHARS            = 1 << 25;
        /// `\cX`
        const ESC_C_CONTROL                = 1 << 26;
        const ESC_OCTAL3                   = 1 << 27;
        const ESC_X_HEX2                   = 1 << 28;
        const ESC_X_BRACE_HEX8             = 1 << 29;
        const ESC_O_BRACE_OCTAL            = 1 << 30;
        /// `\Q...\E`
        const ESC_CAPITAL_Q_QUOTE          = 1 << 31;
        /// `(?...)` group extensions
        const QMARK_GROUP_EFFECT           = 1 << 32;
        /// Perl option letters: `s` is dot-all, `m` is multi-line anchors
        const OPTION_PERL                  = 1 << 33;
        /// Ruby option letters: `m` is dot-all
        const OPTION_RUBY                  = 1 << 34;
        const PLUS_POSSESSIVE_REPEAT       = 1 << 35;
        const PLUS_POSSESSIVE_INTERVAL     = 1 << 36;
        /// `&&` intersection and nested `[...]` inside a class
        const CCLASS_SET_OP                = 1 << 37;
        /// `(?<name>...)` and `(?'name'...)`
        const QMARK_LT_NAMED_GROUP         = 1 << 38;
        /// `\k<name>`
        const ESC_K_NAMED_BACKREF          = 1 << 39;
        /// `\g<name>` and `\g<n>`
        const ESC_G_SUBEXP_CALL            = 1 << 40;
        const ESC_V_VTAB                   = 1 << 41;
        /// `\uHHHH`
        const ESC_U_HEX4                   = 1 << 42;
        const ESC_P_BRACE_CHAR_PROPERTY    = 1 << 43;
        const ESC_P_BRACE_CIRCUMFLEX_NOT   = 1 << 44;
        /// `\h` is a hex digit rather than horizontal space
        const ESC_H_XDIGIT                 = 1 << 45;
        /// `(?(cond)yes|no)`
        const QMARK_LPAREN_IF_ELSE         = 1 << 46;
        /// `\K`
        const ESC_CAPITAL_K_KEEP           = 1 << 47;
        /// `\R`
        const ESC_CAPITAL_R_GENERAL_NEWLINE = 1 << 48;
        /// `\N`
        const ESC_CAPITAL_N_O_SUPER_DOT    = 1 << 49;
        /// `(?~...)`
        const QMARK_TILDE_ABSENT_GROUP     = 1 << 50;
        /// `(?|...)`
        const QMARK_VBAR_BRANCH_RESET      = 1 << 51;
        /// `(?R)`, `(?1)`, `(?&name)`
        const QMARK_PERL_SUBEXP_CALL       = 1 << 52;
        /// `(?P<name>...)`, `(?P=name)`, `(?P>name)`
        const QMARK_CAPITAL_P_NAME         = 1 << 53;
    }
}

bitflags! {
    /// Behavioral choices for constructs the operator set leaves ambiguous.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SyntaxBehavior: u32 {
        /// Anchors are recognized anywhere, not only at the edges.
        const CONTEXT_INDEP_ANCHORS           = 1 << 0;
        /// Repeat operators are operators anywhere.
        const CONTEXT_INDEP_REPEAT_OPS        = 1 << 1;
        /// A repeat operator with no target is an error rather than a literal.
        const CONTEXT_INVALID_REPEAT_OPS      = 1 << 2;
        const ALLOW_UNMATCHED_CLOSE_SUBEXP    = 1 << 3;
        /// A `{` that does not start a valid interval is a literal.
        const ALLOW_INVALID_INTERVAL          = 1 << 4;
        /// `{,n}` means `{0,n}`.
        const ALLOW_INTERVAL_LOW_ABBREV       = 1 << 5;
        /// Backreferences to groups that do not exist are errors.
        const STRICT_CHECK_BACKREF            = 1 << 6;
        /// `(?<=a|bc)` is accepted by splitting the alternatives.
        const DIFFERENT_LEN_ALT_LOOK_BEHIND   = 1 << 7;
        /// Plain groups stop capturing once a named group exists.
        const CAPTURE_ONLY_NAMED_GROUP        = 1 << 8;
        const ALLOW_MULTIPLEX_DEFINITION_NAME = 1 << 9;
        /// `a{n}?` is `(?:a{n})?`, not a lazy interval.
        const FIXED_INTERVAL_IS_GREEDY_ONLY   = 1 << 10;
        /// Lookbehind bodies may have unbounded or variable length.
        const VARIABLE_LEN_LOOK_BEHIND        = 1 << 11;
        const NOT_NEWLINE_IN_NEGATIVE_CC      = 1 << 12;
        const BACKSLASH_ESCAPE_IN_CC          = 1 << 13;
        const ALLOW_EMPTY_RANGE_IN_CC         = 1 << 14;
        const ALLOW_DOUBLE_RANGE_OP_IN_CC     = 1 << 15;
        /// A backreference to a group that did not participate matches empty.
        const BACKREF_UNSET_MATCHES_EMPTY     = 1 << 16;
        /// Quantifiers directly applied to quantifiers are rejected.
        const FORBID_NESTED_REPEAT            = 1 << 17;
    }
}

/// A regex dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Syntax {
    pub operators: SyntaxOperators,
    pub behavior: SyntaxBehavior,
    /// Options every pattern of this dialect starts with.
    pub options: Options,
}

type Op = SyntaxOperators;
type Bv = SyntaxBehavior;

const GNU_OPS: Op = Op::DOT_ANYCHAR
    .union(Op::BRACKET_CC)
    .union(Op::POSIX_BRACKET)
    .union(Op::DECIMAL_BACKREF)
    .union(Op::BRACE_INTERVAL)
    .union(Op::LPAREN_SUBEXP)
    .union(Op::VBAR_ALT)
    .union(Op::ASTERISK_ZERO_INF)
    .union(Op::PLUS_ONE_INF)
    .union(Op::QMARK_ZERO_ONE)
    .union(Op::ESC_AZ_BUF_ANCHOR)
    .union(Op::ESC_CAPITAL_G_BEGIN_ANCHOR)
    .union(Op::ESC_W_WORD)
    .union(Op::ESC_B_WORD_BOUND)
    .union(Op::ESC_S_WHITE_SPACE)
    .union(Op::ESC_D_DIGIT)
    .union(Op::LINE_ANCHOR);

const GNU_BEHAVIOR: Bv = Bv::CONTEXT_INDEP_ANCHORS
    .union(Bv::CONTEXT_INDEP_REPEAT_OPS)
    .union(Bv::CONTEXT_INVALID_REPEAT_OPS)
    .union(Bv::ALLOW_INVALID_INTERVAL)
    .union(Bv::BACKSLASH_ESCAPE_IN_CC)
    .union(Bv::ALLOW_DOUBLE_RANGE_OP_IN_CC);

const PERLISH_ESCAPES: Op = Op::QMARK_NON_GREEDY
    .union(Op::ESC_OCTAL3)
    .union(Op::ESC_X_HEX2)
    .union(Op::ESC_X_BRACE_HEX8)
    .union(Op::ESC_O_BRACE_OCTAL)
    .union(Op::ESC_CONTROL_CHARS)
    .union(Op::ESC_C_CONTROL);

const RUBY_OPS: Op = GNU_OPS
    .union(PERLISH_ESCAPES)
    .union(Op::QMARK_GROUP_EFFECT)
    .union(Op::OPTION_RUBY)
    .union(Op::QMARK_LT_NAMED_GROUP)
    .union(Op::ESC_K_NAMED_BACKREF)
    .union(Op::QMARK_LPAREN_IF_ELSE)
    .union(Op::QMARK_TILDE_ABSENT_GROUP)
    .union(Op::ESC_CAPITAL_R_GENERAL_NEWLINE)
    .union(Op::ESC_CAPITAL_N_O_SUPER_DOT)
    .union(Op::ESC_CAPITAL_K_KEEP)
    .union(Op::ESC_G_SUBEXP_CALL)
    .union(Op::ESC_P_BRACE_CHAR_PROPERTY)
    .union(Op::ESC_P_BRACE_CIRCUMFLEX_NOT)
    .union(Op::PLUS_POSSESSIVE_REPEAT)
    .union(Op::CCLASS_SET_OP)
    .union(Op::ESC_V_VTAB)
    .union(Op::ESC_H_XDIGIT)
    .union(Op::ESC_U_HEX4);

const RUBY_BEHAVIOR: Bv = GNU_BEHAVIOR
    .union(Bv::ALLOW_INTERVAL_LOW_ABBREV)
    .union(Bv::DIFFERENT_LEN_ALT_LOOK_BEHIND)
    .union(Bv::CAPTURE_ONLY_NAMED_GROUP)
    .union(Bv::ALLOW_MULTIPLEX_DEFINITION_NAME)
    .union(Bv::FIXED_INTERVAL_IS_GREEDY_ONLY);

const PERL_OPS: Op = GNU_OPS
    .union(PERLISH_ESCAPES)
    .union(Op::ESC_CAPITAL_Q_QUOTE)
    .union(Op::QMARK_GROUP_EFFECT)
    .union(Op::OPTION_PERL)
    .union(Op::ESC_P_BRACE_CHAR_PROPERTY)
    .union(Op::ESC_P_BRACE_CIRCUMFLEX_NOT)
    .union(Op::PLUS_POSSESSIVE_REPEAT)
    .union(Op::PLUS_POSSESSIVE_INTERVAL)
    .union(Op::QMARK_LPAREN_IF_ELSE)
    .union(Op::ESC_CAPITAL_K_KEEP)
    .union(Op::ESC_CAPITAL_R_GENERAL_NEWLINE)
    .union(Op::ESC_CAPITAL_N_O_SUPER_DOT)
    .union(Op::QMARK_VBAR_BRANCH_RESET)
    .union(Op::QMARK_PERL_SUBEXP_CALL);

const PERL_BEHAVIOR: Bv = GNU_BEHAVIOR.union(Bv::FORBID_NESTED_REPEAT);

impl Syntax {
    /// The engine's native dialect: Ruby plus Perl-style calls and variable lookbehind.
    pub const ONIGURUMA: Self = Self {
        operators: RUBY_OPS
            .union(Op::QMARK_PERL_SUBEXP_CALL)
            .union(Op::QMARK_VBAR_BRANCH_RESET),
        behavior: RUBY_BEHAVIOR.union(Bv::VARIABLE_LEN_LOOK_BEHIND),
        options: Options::empty(),
    };

    pub const RUBY: Self = Self {
        operators: RUBY_OPS,
        behavior: RUBY_BEHAVIOR,
        options: Options::empty(),
    };

    pub const PERL: Self = Self {
        operators: PERL_OPS,
        behavior: PERL_BEHAVIOR,
        options: Options::SINGLELINE,
    };

    /// Perl with named groups, named backreferences and `\g<...>` calls.
    pub const PERL_NT: Self = Self {
        operators: PERL_OPS
            .union(Op::QMARK_LT_NAMED_GROUP)
            .union(Op::ESC_K_NAMED_BACKREF)
            .union(Op::ESC_G_SUBEXP_CALL)
            .union(Op::QMARK_CAPITAL_P_NAME),
        behavior: PERL_BEHAVIOR
            .union(Bv::CAPTURE_ONLY_NAMED_GROUP)
            .union(Bv::ALLOW_MULTIPLEX_DEFINITION_NAME),
        options: Options::SINGLELINE,
    };

    pub const JAVA: Self = Self {
        operators: GNU_OPS
            .union(PERLISH_ESCAPES)
            .union(Op::ESC_CAPITAL_Q_QUOTE)
            .union(Op::QMARK_GROUP_EFFECT)
            .union(Op::OPTION_PERL)
            .union(Op::PLUS_POSSESSIVE_REPEAT)
            .union(Op::PLUS_POSSESSIVE_INTERVAL)
            .union(Op::CCLASS_SET_OP)
            .union(Op::ESC_V_VTAB)
            .union(Op::ESC_U_HEX4)
            .union(Op::ESC_P_BRACE_CHAR_PROPERTY)
            .union(Op::QMARK_LT_NAMED_GROUP)
            .union(Op::ESC_K_NAMED_BACKREF),
        behavior: GNU_BEHAVIOR
            .union(Bv::DIFFERENT_LEN_ALT_LOOK_BEHIND)
            .union(Bv::FORBID_NESTED_REPEAT),
        options: Options::SINGLELINE,
    };

    pub const POSIX_EXTENDED: Self = Self {
        operators: Op::DOT_ANYCHAR
            .union(Op::POSIX_BRACKET)
            .union(Op::LINE_ANCHOR)
            .union(Op::PLUS_ONE_INF)
            .union(Op::QMARK_ZERO_ONE)
            .union(Op::VBAR_ALT)
            .union(Op::ASTERISK_ZERO_INF)
            .union(Op::LPAREN_SUBEXP)
            .union(Op::BRACE_INTERVAL)
            .union(Op::BRACKET_CC)
            .union(Op::DECIMAL_BACKREF)
            .union(Op::ESC_CONTROL_CHARS),
        behavior: Bv::CONTEXT_INDEP_ANCHORS
            .union(Bv::CONTEXT_INDEP_REPEAT_OPS)
            .union(Bv::CONTEXT_INVALID_REPEAT_OPS)
            .union(Bv::ALLOW_UNMATCHED_CLOSE_SUBEXP)
            .union(Bv::ALLOW_DOUBLE_RANGE_OP_IN_CC),
        options: Options::SINGLELINE,
    };

    pub const POSIX_BASIC: Self = Self {
        operators: Op::DOT_ANYCHAR
            .union(Op::POSIX_BRACKET)
            .union(Op::ESC_LPAREN_SUBEXP)
            .union(Op::ESC_BRACE_INTERVAL)
            .union(Op::LINE_ANCHOR)
            .union(Op::ASTERISK_ZERO_INF)
            .union(Op::BRACKET_CC)
            .union(Op::DECIMAL_BACKREF)
            .union(Op::ESC_CONTROL_CHARS),
        behavior: Bv::CONTEXT_INDEP_ANCHORS,
        options: Options::SINGLELINE,
    };

    pub const GREP: Self = Self {
        operators: Op::DOT_ANYCHAR
            .union(Op::BRACKET_CC)
            .union(Op::POSIX_BRACKET)
            .union(Op::DECIMAL_BACKREF)
            .union(Op::ESC_BRACE_INTERVAL)
            .union(Op::ESC_LPAREN_SUBEXP)
            .union(Op::ESC_VBAR_ALT)
            .union(Op::ASTERISK_ZERO_INF)
            .union(Op::ESC_PLUS_ONE_INF)
            .union(Op::ESC_QMARK_ZERO_ONE)
            .union(Op::LINE_ANCHOR)
            .union(Op::ESC_W_WORD)
            .union(Op::ESC_B_WORD_BOUND)
            .union(Op::ESC_LTGT_WORD_BEGIN_END)
            .union(Op::ESC_CONTROL_CHARS),
        behavior: Bv::ALLOW_EMPTY_RANGE_IN_CC.union(Bv::NOT_NEWLINE_IN_NEGATIVE_CC),
        options: Options::empty(),
    };

    pub fn allows(&self, op: SyntaxOperators) -> bool {
        self.operators.contains(op)
    }

    pub fn behaves(&self, bv: SyntaxBehavior) -> bool {
        self.behavior.contains(bv)
    }

    /// Builder-style toggle of one behavior flag.
    pub fn with_behavior(mut self, bv: SyntaxBehavior, on: bool) -> Self {
        self.behavior.set(bv, on);
        self
    }

    /// Builder-style toggle of one operator flag.
    pub fn with_operator(mut self, op: SyntaxOperators, on: bool) -> Self {
        self.operators.set(op, on);
        self
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Self::ONIGURUMA
    }
}
