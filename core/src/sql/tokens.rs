/// SQL keywords, punctuation and operators.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    // Keywords
    SELECT,
    DISTINCT,
    FROM,
    WHERE,
    AND,
    OR,
    NOT,
    AS,
    ON,
    JOIN,
    INNER,
    LEFT,
    CROSS,
    GROUP,
    HAVING,
    ORDER,
    BY,
    ASC,
    DESC,
    NULLS,
    FIRST,
    LAST,
    LIMIT,
    OFFSET,
    UPDATE,
    SET,
    DELETE,
    INSERT,
    INTO,
    VALUES,
    CASE,
    WHEN,
    THEN,
    ELSE,
    END,
    IN,
    BETWEEN,
    LIKE,
    IS,
    NULL,
    EXISTS,
    // Punctuation
    LPAREN,
    RPAREN,
    COMMA,
    DOT,
    // Operators
    STAR,
    EQ,
    NE,
    LT,
    GT,
    LE,
    GE,
    PLUS,
    MINUS,
    CONCAT,
}

impl Token {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Token::SELECT => "SELECT",
            Token::DISTINCT => "DISTINCT",
            Token::FROM => "FROM",
            Token::WHERE => "WHERE",
            Token::AND => "AND",
            Token::OR => "OR",
            Token::NOT => "NOT",
            Token::AS => "AS",
            Token::ON => "ON",
            Token::JOIN => "JOIN",
            Token::INNER => "INNER",
            Token::LEFT => "LEFT",
            Token::CROSS => "CROSS",
            Token::GROUP => "GROUP",
            Token::HAVING => "HAVING",
            Token::ORDER => "ORDER",
            Token::BY => "BY",
            Token::ASC => "ASC",
            Token::DESC => "DESC",
            Token::NULLS => "NULLS",
            Token::FIRST => "FIRST",
            Token::LAST => "LAST",
            Token::LIMIT => "LIMIT",
            Token::OFFSET => "OFFSET",
            Token::UPDATE => "UPDATE",
            Token::SET => "SET",
            Token::DELETE => "DELETE",
            Token::INSERT => "INSERT",
            Token::INTO => "INTO",
            Token::VALUES => "VALUES",
            Token::CASE => "CASE",
            Token::WHEN => "WHEN",
            Token::THEN => "THEN",
            Token::ELSE => "ELSE",
            Token::END => "END",
            Token::IN => "IN",
            Token::BETWEEN => "BETWEEN",
            Token::LIKE => "LIKE",
            Token::IS => "IS",
            Token::NULL => "NULL",
            Token::EXISTS => "EXISTS",
            Token::LPAREN => "(",
            Token::RPAREN => ")",
            Token::COMMA => ",",
            Token::DOT => ".",
            Token::STAR => "*",
            Token::EQ => "=",
            Token::NE => "<>",
            Token::LT => "<",
            Token::GT => ">",
            Token::LE => "<=",
            Token::GE => ">=",
            Token::PLUS => "+",
            Token::MINUS => "-",
            Token::CONCAT => "||",
        }
    }

    /// Operators are always surrounded by spaces.
    #[inline]
    pub const fn is_operator(&self) -> bool {
        matches!(
            self,
            Token::EQ
                | Token::NE
                | Token::LT
                | Token::GT
                | Token::LE
                | Token::GE
                | Token::PLUS
                | Token::MINUS
                | Token::STAR
                | Token::CONCAT
        )
    }

    #[inline]
    pub const fn is_punctuation(&self) -> bool {
        matches!(
            self,
            Token::LPAREN | Token::RPAREN | Token::COMMA | Token::DOT
        )
    }
}
