#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SyntaxKind {
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    SEMICOLON,
    EQ,
    FAT_ARROW,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    AMPERSAND,
    LT,
    GT,
    LT_EQ,
    GT_EQ,
    NOT_EQ,

    AND_KW,
    OR_KW,
    NOT_KW,
    IS_KW,
    AS_KW,
    EACH_KW,
    IF_KW,
    THEN_KW,
    ELSE_KW,
    LET_KW,
    IN_KW,
    SECTION_KW,
    SHARED_KW,
    OPTIONAL_KW,
    NULLABLE_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,

    IDENT,
    INT_NUMBER,
    HEX_NUMBER,
    FLOAT_NUMBER,
    TEXT,

    UNKNOWN,
    EOF,

    LITERAL_EXPR,
    IDENT_EXPR,
    CONSTANT,
    PAREN_EXPR,
    LIST_EXPR,
    RECORD_EXPR,
    KEY_VALUE,
    EACH_EXPR,
    IF_EXPR,
    LET_EXPR,
    FUNCTION_EXPR,
    PARAM_LIST,
    PARAMETER,
    TYPE_ANNOTATION,
    NULLABLE_TYPE,
    PRIMITIVE_TYPE,
    INVOKE_EXPR,
    UNARY_EXPR,
    ARITHMETIC_EXPR,
    RELATIONAL_EXPR,
    EQUALITY_EXPR,
    LOGICAL_EXPR,
    AS_EXPR,
    IS_EXPR,
    SECTION,
    SECTION_MEMBER,
    ERROR,
}

impl SyntaxKind {
    /// User-facing spelling used in "expected ..." diagnostics.
    pub fn repr(self) -> &'static str {
        use SyntaxKind::*;

        match self {
            LEFT_PAREN => "'('",
            RIGHT_PAREN => "')'",
            LEFT_BRACKET => "'['",
            RIGHT_BRACKET => "']'",
            LEFT_BRACE => "'{'",
            RIGHT_BRACE => "'}'",
            COMMA => "','",
            SEMICOLON => "';'",
            EQ => "'='",
            FAT_ARROW => "'=>'",
            PLUS => "'+'",
            MINUS => "'-'",
            STAR => "'*'",
            SLASH => "'/'",
            AMPERSAND => "'&'",
            LT => "'<'",
            GT => "'>'",
            LT_EQ => "'<='",
            GT_EQ => "'>='",
            NOT_EQ => "'<>'",
            AND_KW => "'and'",
            OR_KW => "'or'",
            NOT_KW => "'not'",
            IS_KW => "'is'",
            AS_KW => "'as'",
            EACH_KW => "'each'",
            IF_KW => "'if'",
            THEN_KW => "'then'",
            ELSE_KW => "'else'",
            LET_KW => "'let'",
            IN_KW => "'in'",
            SECTION_KW => "'section'",
            SHARED_KW => "'shared'",
            OPTIONAL_KW => "'optional'",
            NULLABLE_KW => "'nullable'",
            TRUE_KW => "'true'",
            FALSE_KW => "'false'",
            NULL_KW => "'null'",
            IDENT => "an identifier",
            INT_NUMBER | HEX_NUMBER | FLOAT_NUMBER => "a number",
            TEXT => "a text literal",
            UNKNOWN => "an unknown token",
            EOF => "end of input",
            _ => "an expression",
        }
    }
}

/// Primitive type names accepted in `as`/`is` assertions and parameter
/// annotations. These are contextual, lexed as plain identifiers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PrimitiveTypeKind {
    Any,
    Function,
    List,
    Logical,
    Null,
    Number,
    Record,
    Table,
    Text,
}

impl PrimitiveTypeKind {
    pub fn from_text(text: &str) -> Option<Self> {
        let kind = match text {
            "any" => Self::Any,
            "function" => Self::Function,
            "list" => Self::List,
            "logical" => Self::Logical,
            "null" => Self::Null,
            "number" => Self::Number,
            "record" => Self::Record,
            "table" => Self::Table,
            "text" => Self::Text,
            _ => return None,
        };

        Some(kind)
    }
}
