//! a module turns a String expression into a syntax tree
//!
//! The lexer and the recursive-descent parser know nothing about what names mean: they
//! produce a `Node` tree of literals, names, operators, calls and lists, and the calculator
//! layer decides what each name refers to.
//!
//! Precedence, lowest first:
//!
//! | level    | syntax                                        | associativity |
//! |----------|-----------------------------------------------|---------------|
//! | sum      | `a + b`, `a - b`                              | left          |
//! | product  | `a * b`, `a / b`, implicit `a b` (optional)   | left          |
//! | unary    | `-a`, `+a`                                    | prefix        |
//! | power    | `a ** b`, `a ^ b` (optional)                  | right         |
//! | postfix  | `a!` (optional)                               | postfix       |
//! | primary  | number, name, `name(args)`, `(a)`, `[a, b]`   |               |
//!
//! The exponent of a power may carry a sign (`x**-2`). An implicit product takes a
//! power-level operand on the right, so `2x^2` is `2*(x**2)` and `1/2x` is `(1/2)*x`.
//! An implicitly applied function takes a power-level argument too: `sin x^2` is
//! `sin(x**2)`, `sin^2 x` is `sin(x)**2`.
//!
//! # Example
//! ```rust, ignore
//! let options = ParseOptions::default();
//! let tree = parse_expression_func("x**2 + sin(x)", &options).unwrap();
//! ```

/// Guard against stack exhaustion on inputs like "((((((x))))))" or "------x".
const MAX_NESTING: usize = 200;

static END: Token = Token::Eof;

/// Grammar extensions switched on per parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// `^` is a power operator; otherwise it is rejected
    pub caret_is_power: bool,
    /// postfix `!` is the factorial; otherwise it is rejected
    pub factorial_notation: bool,
    /// operands written side by side are multiplied
    pub implicit_multiplication: bool,
    /// a function name applies to the operand after it: `sin x`
    pub implicit_application: bool,
    /// a numeric power right after a function name raises the call: `sin^2(x)`
    pub function_exponentiation: bool,
    /// names that `implicit_application` and `function_exponentiation` act on
    pub function_names: &'static [&'static str],
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            caret_is_power: true,
            factorial_notation: true,
            implicit_multiplication: false,
            implicit_application: false,
            function_exponentiation: false,
            function_names: &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Syntax tree of an input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// numeric literal as written: "12", "1.5", "2e-3"
    Number(String),
    /// quoted string literal
    Str(String),
    Name(String),
    Neg(Box<Node>),
    Binary(BinOp, Box<Node>, Box<Node>),
    /// product written without an operator
    Implicit(Box<Node>, Box<Node>),
    Factorial(Box<Node>),
    Call(String, Vec<Node>),
    List(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(String),
    Ident(String),
    Str(String),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    Caret,
    Bang,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(s) => format!("number {}", s),
            Token::Ident(s) => format!("name '{}'", s),
            Token::Str(_) => "string literal".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::DoubleStar => "'**'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::Bang => "'!'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }

    /// tokens that can begin an operand of an implicit product
    fn starts_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Ident(_) | Token::LParen)
    }
}

//___________________________________LEXER___________________________________

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Lexer {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn take_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn read_number(&mut self) -> String {
        let start = self.pos;
        self.take_digits();
        if self.peek_char() == Some('.') {
            self.pos += 1;
            self.take_digits();
        }
        // an exponent only when digits follow: "2e" is 2 times e in relaxed mode
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let digit_at = |offset: usize| self.peek_at(offset).is_some_and(|c| c.is_ascii_digit());
            let plain = digit_at(1);
            let signed = matches!(self.peek_at(1), Some('+') | Some('-')) && digit_at(2);
            if plain {
                self.pos += 1;
                self.take_digits();
            } else if signed {
                self.pos += 2;
                self.take_digits();
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn read_ident(&mut self) -> String {
        let start = self.pos;
        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn read_string(&mut self, quote: char) -> Result<String, String> {
        let start = self.pos;
        self.pos += 1;
        let mut content = String::new();
        loop {
            match self.peek_char() {
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(content);
                }
                Some(c) => {
                    content.push(c);
                    self.pos += 1;
                }
                None => return Err(format!("unterminated string at position {}", start)),
            }
        }
    }

    /// Next token and its character position.
    fn next_token(&mut self) -> Result<(Token, usize), String> {
        self.skip_whitespace();
        let position = self.pos;
        let Some(c) = self.peek_char() else {
            return Ok((Token::Eof, position));
        };
        let single = |token: Token, lexer: &mut Lexer| {
            lexer.pos += 1;
            token
        };
        let token = match c {
            '+' => single(Token::Plus, self),
            '-' => single(Token::Minus, self),
            '*' if self.peek_at(1) == Some('*') => {
                self.pos += 2;
                Token::DoubleStar
            }
            '*' => single(Token::Star, self),
            '/' => single(Token::Slash, self),
            '^' => single(Token::Caret, self),
            '!' => single(Token::Bang, self),
            '(' => single(Token::LParen, self),
            ')' => single(Token::RParen, self),
            '[' => single(Token::LBracket, self),
            ']' => single(Token::RBracket, self),
            ',' => single(Token::Comma, self),
            '\'' | '"' => Token::Str(self.read_string(c)?),
            '0'..='9' => Token::Number(self.read_number()),
            '.' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => {
                Token::Number(self.read_number())
            }
            'a'..='z' | 'A'..='Z' | '_' => Token::Ident(self.read_ident()),
            other => {
                return Err(format!(
                    "unexpected character '{}' at position {}",
                    other, position
                ));
            }
        };
        Ok((token, position))
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, String> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let (token, position) = lexer.next_token()?;
        let end = token == Token::Eof;
        tokens.push((token, position));
        if end {
            return Ok(tokens);
        }
    }
}

//___________________________________PARSER___________________________________

struct Parser<'a> {
    tokens: Vec<(Token, usize)>,
    index: usize,
    options: &'a ParseOptions,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> &Token {
        self.tokens
            .get(self.index)
            .map(|(t, _)| t)
            .unwrap_or(&END)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.index)
            .or_else(|| self.tokens.last())
            .map(|(_, p)| *p)
            .unwrap_or(0)
    }

    fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    fn unexpected(&self) -> String {
        format!(
            "unexpected {} at position {}",
            self.current().describe(),
            self.position()
        )
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        if *self.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(format!(
                "expected {} but found {} at position {}",
                expected.describe(),
                self.current().describe(),
                self.position()
            ))
        }
    }

    fn parse_expr(&mut self) -> Result<Node, String> {
        self.parse_sum()
    }

    fn parse_sum(&mut self) -> Result<Node, String> {
        let mut left = self.parse_product()?;
        loop {
            let op = match self.current() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_product()?;
            left = Node::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_product(&mut self) -> Result<Node, String> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                token if self.options.implicit_multiplication && token.starts_operand() => {
                    let right = self.parse_power()?;
                    left = Node::Implicit(Box::new(left), Box::new(right));
                    continue;
                }
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Node::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn enter(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(format!(
                "expression nested too deeply at position {}",
                self.position()
            ));
        }
        Ok(())
    }

    fn parse_unary(&mut self) -> Result<Node, String> {
        self.enter()?;
        let node = match self.current() {
            Token::Minus => {
                self.advance();
                Node::Neg(Box::new(self.parse_unary()?))
            }
            Token::Plus => {
                self.advance();
                self.parse_unary()?
            }
            _ => self.parse_power()?,
        };
        self.depth -= 1;
        Ok(node)
    }

    fn parse_power(&mut self) -> Result<Node, String> {
        let base = self.parse_postfix()?;
        match self.current() {
            Token::DoubleStar => {}
            Token::Caret if self.options.caret_is_power => {}
            Token::Caret => {
                return Err(format!(
                    "'^' is not a power operator here, use '**' (position {})",
                    self.position()
                ));
            }
            _ => return Ok(base),
        }
        self.advance();
        let exponent = self.parse_unary()?;
        Ok(Node::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)))
    }

    fn parse_postfix(&mut self) -> Result<Node, String> {
        let mut node = self.parse_primary()?;
        while *self.current() == Token::Bang {
            if !self.options.factorial_notation {
                return Err(self.unexpected());
            }
            self.advance();
            if *self.current() == Token::Bang {
                return Err(format!(
                    "double factorial is not supported (position {})",
                    self.position()
                ));
            }
            node = Node::Factorial(Box::new(node));
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<Node, String> {
        match self.current().clone() {
            Token::Number(text) => {
                self.advance();
                Ok(Node::Number(text))
            }
            Token::Str(text) => {
                self.advance();
                Ok(Node::Str(text))
            }
            Token::Ident(name) => {
                self.advance();
                if *self.current() == Token::LParen {
                    self.advance();
                    let args = self.parse_items(Token::RParen)?;
                    Ok(Node::Call(name, args))
                } else if self.options.function_names.contains(&name.as_str()) {
                    self.parse_application(name)
                } else {
                    Ok(Node::Name(name))
                }
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::LBracket => {
                self.advance();
                let items = self.parse_items(Token::RBracket)?;
                Ok(Node::List(items))
            }
            _ => Err(self.unexpected()),
        }
    }

    /// A function name not directly followed by '(': `sin x`, `sin^2(x)`, `sin^2 x`.
    fn parse_application(&mut self, name: String) -> Result<Node, String> {
        let power_sign = match self.current() {
            Token::DoubleStar => true,
            Token::Caret => self.options.caret_is_power,
            _ => false,
        };
        let exponent = match self.tokens.get(self.index + 1) {
            Some((Token::Number(text), _))
                if self.options.function_exponentiation && power_sign =>
            {
                let text = text.clone();
                self.advance();
                self.advance();
                Some(Node::Number(text))
            }
            _ => None,
        };
        let args = if *self.current() == Token::LParen {
            self.advance();
            self.parse_items(Token::RParen)?
        } else if self.options.implicit_application && self.current().starts_operand() {
            self.enter()?;
            let argument = self.parse_power()?;
            self.depth -= 1;
            vec![argument]
        } else if exponent.is_some() {
            return Err(self.unexpected());
        } else {
            return Ok(Node::Name(name));
        };
        let call = Node::Call(name, args);
        Ok(match exponent {
            Some(exponent) => Node::Binary(BinOp::Pow, Box::new(call), Box::new(exponent)),
            None => call,
        })
    }

    /// Comma separated expressions up to and including the closing token.
    fn parse_items(&mut self, close: Token) -> Result<Vec<Node>, String> {
        let mut items = Vec::new();
        if *self.current() == close {
            self.advance();
            return Ok(items);
        }
        loop {
            items.push(self.parse_expr()?);
            if *self.current() == Token::Comma {
                self.advance();
                continue;
            }
            self.expect(close)?;
            return Ok(items);
        }
    }
}

/// Parses a whole input line into a syntax tree.
pub fn parse_expression_func(input: &str, options: &ParseOptions) -> Result<Node, String> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        index: 0,
        options,
        depth: 0,
    };
    if *parser.current() == Token::Eof {
        return Err("empty expression".to_string());
    }
    let node = parser.parse_expr()?;
    if *parser.current() != Token::Eof {
        return Err(parser.unexpected());
    }
    Ok(node)
}
