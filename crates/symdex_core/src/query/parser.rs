//! Filter expression parser.
//!
//! Parses the OData `$filter` grammar into a generic [`ParseNode`] tree.
//! The parser accepts the whole operator set (`and`, `not`, `ne`, ...) so
//! that unsupported operators are reported by name when the tree is
//! transformed, rather than as syntax errors.
//!
//! Precedence, lowest first: `or`, `and`, comparison, `not`, primary.
//!
//! Every operator, parenthesis and call adds a level to the tree, and the
//! parser refuses to go deeper than [`MAX_DEPTH`] levels.

use crate::error::{CoreError, CoreResult};
use crate::query::lexer::{tokenize, Token};

/// Role of a parse node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Logical or comparison operator; `value` is the operator keyword.
    Logical,
    /// Function call; `value` is the function name.
    Func,
    /// Property reference; `value` is the property name.
    Property,
    /// Literal; `value` is the source text, quotes included.
    Literal,
}

/// A node of the generic expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    /// Role of the node.
    pub kind: NodeKind,
    /// Operator, function name, property name or literal text.
    pub value: String,
    /// Operands, in source order.
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    fn leaf(kind: NodeKind, value: String) -> Self {
        Self {
            kind,
            value,
            children: Vec::new(),
        }
    }

    fn node(kind: NodeKind, value: &str, children: Vec<ParseNode>) -> Self {
        Self {
            kind,
            value: value.to_string(),
            children,
        }
    }
}

static EOF: Token = Token::Eof;

const COMPARISON_OPERATORS: [&str; 6] = ["eq", "ne", "gt", "ge", "lt", "le"];

/// Deepest tree a filter expression may produce.
pub const MAX_DEPTH: usize = 128;

/// Recursive-descent parser over a token stream.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    /// Creates a parser over `tokens`, which must end with [`Token::Eof`].
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parses a complete expression.
    ///
    /// # Errors
    ///
    /// Returns `Query` on empty input, trailing tokens, malformed syntax or
    /// nesting deeper than [`MAX_DEPTH`].
    pub fn parse(&mut self) -> CoreResult<ParseNode> {
        if self.current() == &Token::Eof {
            return Err(CoreError::query("empty filter expression"));
        }
        let node = self.parse_or()?;
        match self.current() {
            Token::Eof => Ok(node),
            other => Err(CoreError::query(format!("unexpected token {other:?}"))),
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&EOF)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        self.position += 1;
        token
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.current(), Token::Ident(word) if word == keyword)
    }

    fn expect(&mut self, expected: &Token) -> CoreResult<()> {
        if self.current() == expected {
            self.advance();
            Ok(())
        } else {
            Err(CoreError::query(format!(
                "expected {expected:?}, found {:?}",
                self.current()
            )))
        }
    }

    /// Enters one more level of nesting.
    fn descend(&mut self) -> CoreResult<()> {
        if self.depth >= MAX_DEPTH {
            return Err(CoreError::query(format!(
                "filter expression nested deeper than {MAX_DEPTH} levels"
            )));
        }
        self.depth += 1;
        Ok(())
    }

    // Each fold makes the chain one level deeper, so the depth is only
    // restored once the whole chain is built.
    fn parse_or(&mut self) -> CoreResult<ParseNode> {
        let outer = self.depth;
        let mut left = self.parse_and()?;
        while self.is_keyword("or") {
            self.advance();
            self.descend()?;
            let right = self.parse_and()?;
            left = ParseNode::node(NodeKind::Logical, "or", vec![left, right]);
        }
        self.depth = outer;
        Ok(left)
    }

    fn parse_and(&mut self) -> CoreResult<ParseNode> {
        let outer = self.depth;
        let mut left = self.parse_comparison()?;
        while self.is_keyword("and") {
            self.advance();
            self.descend()?;
            let right = self.parse_comparison()?;
            left = ParseNode::node(NodeKind::Logical, "and", vec![left, right]);
        }
        self.depth = outer;
        Ok(left)
    }

    fn parse_comparison(&mut self) -> CoreResult<ParseNode> {
        let left = self.parse_unary()?;
        let operator = match self.current() {
            Token::Ident(word) if COMPARISON_OPERATORS.contains(&word.as_str()) => word.clone(),
            _ => return Ok(left),
        };
        self.advance();
        self.descend()?;
        let right = self.parse_unary()?;
        self.depth -= 1;
        Ok(ParseNode::node(NodeKind::Logical, &operator, vec![left, right]))
    }

    fn parse_unary(&mut self) -> CoreResult<ParseNode> {
        if self.is_keyword("not") {
            self.advance();
            self.descend()?;
            let operand = self.parse_unary()?;
            self.depth -= 1;
            return Ok(ParseNode::node(NodeKind::Logical, "not", vec![operand]));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> CoreResult<ParseNode> {
        match self.advance() {
            Token::LParen => {
                self.descend()?;
                let inner = self.parse_or()?;
                self.expect(&Token::RParen)?;
                self.depth -= 1;
                Ok(inner)
            }
            Token::Literal(text) => Ok(ParseNode::leaf(NodeKind::Literal, text)),
            Token::Ident(name) if self.current() == &Token::LParen => {
                self.advance();
                self.descend()?;
                let args = self.parse_arguments()?;
                self.depth -= 1;
                Ok(ParseNode {
                    kind: NodeKind::Func,
                    value: name,
                    children: args,
                })
            }
            Token::Ident(name) if is_reserved(&name) => Err(CoreError::query(format!(
                "unexpected keyword {name:?}"
            ))),
            Token::Ident(name) => Ok(ParseNode::leaf(NodeKind::Property, name)),
            other => Err(CoreError::query(format!("unexpected token {other:?}"))),
        }
    }

    /// Parses `arg (, arg)* )` after the opening parenthesis.
    fn parse_arguments(&mut self) -> CoreResult<Vec<ParseNode>> {
        let mut args = Vec::new();
        if self.current() == &Token::RParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_or()?);
            match self.advance() {
                Token::Comma => {}
                Token::RParen => return Ok(args),
                other => {
                    return Err(CoreError::query(format!(
                        "expected ',' or ')' in argument list, found {other:?}"
                    )))
                }
            }
        }
    }
}

fn is_reserved(word: &str) -> bool {
    matches!(word, "or" | "and" | "not") || COMPARISON_OPERATORS.contains(&word)
}

/// Parses a filter expression into its generic tree.
///
/// ```rust
/// use symdex_core::query::{parse, NodeKind};
///
/// let node = parse("Color eq 'White' or startswith(Color,'Gr')").unwrap();
/// assert_eq!(node.kind, NodeKind::Logical);
/// assert_eq!(node.value, "or");
/// assert_eq!(node.children[1].value, "startswith");
/// ```
pub fn parse(filter: &str) -> CoreResult<ParseNode> {
    Parser::new(tokenize(filter)?).parse()
}
