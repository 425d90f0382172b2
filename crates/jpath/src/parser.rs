//! Compiles path text into an ordered chain of [`PathStep`]s.
//!
//! The structure of a path is context sensitive (a space ends a member, `]`
//! may follow an indexer but not a name), so the outer grammar is a cursor
//! driven recursive descent. Tokens are recognised with `nom`.
use crate::ast::{CompositeOperator, Operand, PathStep, QueryExpression, QueryOperator};
use crate::error::JPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till1, take_while},
    character::complete::{i64 as nom_i64, one_of},
    combinator::{all_consuming, map, map_res, not, value},
    number::complete::recognize_float,
    sequence::terminated,
};
use serde_json::Value;

const OPEN_INDEXER: &str = "Path ended with open indexer.";
const OPEN_QUERY: &str = "Path ended with open query.";
const OPEN_STRING: &str = "Path ended with open string.";
const OPEN_REGEX: &str = "Path ended with an open regex.";
const UNEXPECTED_END: &str = "Unexpected end while parsing path.";

const IN_PATH: &str = "while parsing path";
const IN_INDEXER: &str = "while parsing path indexer";
const IN_QUERY: &str = "while parsing path query";
const AFTER_INDEXER: &str = "following indexer";

// --- Main Public Parser ---

/// Parses `text` into steps. An empty result is the identity path.
pub fn parse_path(text: &str) -> Result<Vec<PathStep>, JPathError> {
    let text = text.trim();
    let steps = PathParser::new(text).parse_main()?;
    log::trace!("Parsed path '{}' into {} step(s)", text, steps.len());
    Ok(steps)
}

struct PathParser<'t> {
    text: &'t str,
    pos: usize,
}

impl<'t> PathParser<'t> {
    fn new(text: &'t str) -> Self {
        Self { text, pos: 0 }
    }

    // --- Cursor ---

    fn rest(&self) -> &'t str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// The current character, or a syntax error carrying `eof_message`.
    fn current(&self, eof_message: &str) -> Result<char, JPathError> {
        self.peek().ok_or_else(|| JPathError::syntax(eof_message))
    }

    /// Runs a `nom` parser at the cursor, advancing past what it consumed.
    fn run<O, P>(&mut self, mut parser: P) -> Option<O>
    where
        P: Parser<&'t str, Output = O, Error = nom::error::Error<&'t str>>,
    {
        match parser.parse(self.rest()) {
            Ok((remaining, output)) => {
                self.pos = self.text.len() - remaining.len();
                Some(output)
            }
            Err(_) => None,
        }
    }

    fn eat_whitespace(&mut self) {
        self.run(take_while(|c: char| c == ' '));
    }

    // --- Paths ---

    fn parse_main(mut self) -> Result<Vec<PathStep>, JPathError> {
        let mut steps = Vec::new();
        if self.text.is_empty() || self.text == "$" {
            return Ok(steps);
        }
        if self.peek() == Some('$') && matches!(self.peek_second(), Some('.' | '[')) {
            self.bump();
        }

        if !self.parse_steps(&mut steps, false)? {
            let stopped_at = self.peek();
            self.eat_whitespace();
            if let (Some(c), false) = (stopped_at, self.at_end()) {
                return Err(JPathError::unexpected_character(IN_PATH, c));
            }
        }
        Ok(steps)
    }

    /// Parses consecutive steps until a terminator. Returns whether the input
    /// was fully consumed.
    fn parse_steps(&mut self, steps: &mut Vec<PathStep>, in_query: bool) -> Result<bool, JPathError> {
        let mut part_start = self.pos;
        let mut scan = false;
        let mut following_indexer = false;
        let mut following_dot = false;

        while let Some(c) = self.peek() {
            match c {
                '[' => {
                    if self.pos > part_start {
                        steps.push(member_step(&self.text[part_start..self.pos], scan));
                        scan = false;
                    }
                    self.parse_indexer(steps, scan)?;
                    scan = false;
                    part_start = self.pos;
                    following_indexer = true;
                    following_dot = false;
                }
                ']' | ')' | ' ' => break,
                '.' => {
                    if self.pos > part_start {
                        steps.push(member_step(&self.text[part_start..self.pos], scan));
                        scan = false;
                    }
                    self.bump();
                    if self.peek() == Some('.') {
                        scan = true;
                        self.bump();
                    }
                    part_start = self.pos;
                    following_indexer = false;
                    following_dot = true;
                }
                _ if in_query && is_query_terminator(c) => break,
                _ if following_indexer => {
                    return Err(JPathError::unexpected_character(AFTER_INDEXER, c));
                }
                _ => {
                    if self
                        .run(take_till1(|c: char| is_member_delimiter(c, in_query)))
                        .is_none()
                    {
                        self.bump();
                    }
                }
            }
        }

        let at_end = self.at_end();
        if self.pos > part_start {
            steps.push(member_step(&self.text[part_start..self.pos], scan));
        } else if following_dot && (at_end || in_query) {
            return Err(JPathError::syntax(UNEXPECTED_END));
        }
        Ok(at_end)
    }

    // --- Indexers ---

    fn parse_indexer(&mut self, steps: &mut Vec<PathStep>, scan: bool) -> Result<(), JPathError> {
        self.bump();
        self.current(OPEN_INDEXER)?;
        self.eat_whitespace();

        match self.current(OPEN_INDEXER)? {
            '\'' => steps.push(self.parse_quoted_fields(scan)?),
            '?' => {
                let expression = self.parse_query()?;
                steps.push(if scan {
                    PathStep::QueryScan(expression)
                } else {
                    PathStep::Query(expression)
                });
            }
            _ => {
                if scan {
                    steps.push(PathStep::Scan(None));
                }
                steps.push(self.parse_array_indexer()?);
            }
        }
        Ok(())
    }

    fn parse_quoted_fields(&mut self, scan: bool) -> Result<PathStep, JPathError> {
        let mut fields = Vec::new();
        loop {
            match self.current(OPEN_INDEXER)? {
                '\'' => fields.push(self.read_quoted_string()?),
                c => return Err(JPathError::unexpected_character(IN_INDEXER, c)),
            }
            self.eat_whitespace();
            match self.current(OPEN_INDEXER)? {
                ']' => {
                    self.bump();
                    break;
                }
                ',' => {
                    self.bump();
                    self.eat_whitespace();
                }
                c => return Err(JPathError::unexpected_character(IN_INDEXER, c)),
            }
        }

        Ok(if fields.len() == 1 {
            let name = fields.swap_remove(0);
            if scan {
                PathStep::Scan(Some(name))
            } else {
                PathStep::Field(Some(name))
            }
        } else if scan {
            PathStep::ScanMultiple(fields)
        } else {
            PathStep::MultiField(fields)
        })
    }

    /// Reads a single-quoted string with the cursor on the opening quote.
    fn read_quoted_string(&mut self) -> Result<String, JPathError> {
        self.bump();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            self.bump();
            match c {
                '\\' => match self.peek() {
                    Some(escaped @ ('\'' | '\\')) => {
                        self.bump();
                        text.push(escaped);
                    }
                    Some(other) => {
                        return Err(JPathError::syntax(format!(
                            "Unknown escape character: \\{other}"
                        )));
                    }
                    None => break,
                },
                '\'' => return Ok(text),
                _ => text.push(c),
            }
        }
        Err(JPathError::syntax(OPEN_STRING))
    }

    /// Index, multi-index, wildcard or slice, with the cursor past any
    /// leading whitespace.
    fn parse_array_indexer(&mut self) -> Result<PathStep, JPathError> {
        let text = self.text;
        let mut start = self.pos;
        let mut end: Option<usize> = None;
        let mut indexes: Option<Vec<i64>> = None;
        let mut bounds: [Option<i64>; 3] = [None; 3];
        let mut colons = 0;

        while let Some(c) = self.peek() {
            let number = &text[start..end.unwrap_or(self.pos)];
            match c {
                ' ' => {
                    end = Some(self.pos);
                    self.eat_whitespace();
                }
                ']' => {
                    self.bump();
                    if let Some(mut indexes) = indexes {
                        indexes.push(parse_index(number)?);
                        return Ok(PathStep::MultiIndex(indexes));
                    }
                    if colons > 0 {
                        if !number.is_empty() {
                            bounds[colons] = Some(parse_index(number)?);
                        }
                        let [start, end, step] = bounds;
                        return Ok(PathStep::Slice { start, end, step });
                    }
                    return Ok(PathStep::Index(Some(parse_index(number)?)));
                }
                ',' if colons == 0 => {
                    indexes
                        .get_or_insert_with(Vec::new)
                        .push(parse_index(number)?);
                    self.bump();
                    self.eat_whitespace();
                    start = self.pos;
                    end = None;
                }
                ':' if indexes.is_none() && colons < 2 => {
                    if !number.is_empty() {
                        bounds[colons] = Some(parse_index(number)?);
                    }
                    colons += 1;
                    self.bump();
                    self.eat_whitespace();
                    start = self.pos;
                    end = None;
                }
                '*' if indexes.is_none() && colons == 0 && number.is_empty() => {
                    self.bump();
                    self.current(OPEN_INDEXER)?;
                    self.eat_whitespace();
                    return match self.current(OPEN_INDEXER)? {
                        ']' => {
                            self.bump();
                            Ok(PathStep::Index(None))
                        }
                        other => Err(JPathError::unexpected_character(IN_INDEXER, other)),
                    };
                }
                '-' | '0'..='9' if end.is_none() => self.bump(),
                other => return Err(JPathError::unexpected_character(IN_INDEXER, other)),
            }
        }
        Err(JPathError::syntax(OPEN_INDEXER))
    }

    // --- Queries ---

    /// `?( expression )]` with the cursor on the `?`.
    fn parse_query(&mut self) -> Result<QueryExpression, JPathError> {
        self.bump();
        self.eat_whitespace();
        match self.current(OPEN_INDEXER)? {
            '(' => self.bump(),
            c => return Err(JPathError::unexpected_character(IN_INDEXER, c)),
        }

        let expression = self.parse_expression()?;
        self.bump();
        self.current(OPEN_INDEXER)?;
        self.eat_whitespace();
        match self.current(OPEN_INDEXER)? {
            ']' => {
                self.bump();
                Ok(expression)
            }
            c => Err(JPathError::unexpected_character(IN_INDEXER, c)),
        }
    }

    /// Comparisons joined by `&&` and `||`, ending with the cursor on `)`.
    /// `&&` binds tighter than `||`.
    fn parse_expression(&mut self) -> Result<QueryExpression, JPathError> {
        let mut alternatives = Vec::new();
        let mut conjunction = Vec::new();

        loop {
            self.current(OPEN_QUERY)?;
            let left = self.parse_side()?;
            let comparison = match self.peek() {
                Some(')' | '|' | '&') => QueryExpression::Comparison {
                    operator: QueryOperator::Exists,
                    left,
                    right: None,
                },
                _ => {
                    let operator = self.parse_operator()?;
                    let right = self.parse_side()?;
                    QueryExpression::Comparison {
                        operator,
                        left,
                        right: Some(right),
                    }
                }
            };
            conjunction.push(comparison);

            match self.current(OPEN_QUERY)? {
                ')' => {
                    alternatives.push(combine(CompositeOperator::And, conjunction));
                    return Ok(combine(CompositeOperator::Or, alternatives));
                }
                '&' if self.run(tag("&&")).is_some() => {}
                '|' if self.run(tag("||")).is_some() => {
                    let group = std::mem::take(&mut conjunction);
                    alternatives.push(combine(CompositeOperator::And, group));
                }
                c => return Err(JPathError::unexpected_character(IN_QUERY, c)),
            }
        }
    }

    /// One comparison operand, leaving the cursor on the next non-space
    /// character.
    fn parse_side(&mut self) -> Result<Operand, JPathError> {
        self.eat_whitespace();
        let operand = match self.current(OPEN_QUERY)? {
            anchor @ ('$' | '@') => {
                let mut steps = Vec::new();
                if anchor == '$' {
                    steps.push(PathStep::Root);
                }
                self.bump();
                if self.parse_steps(&mut steps, true)? {
                    return Err(JPathError::syntax(OPEN_QUERY));
                }
                Operand::Path(steps)
            }
            c => match self.parse_literal()? {
                Some(literal) => Operand::Literal(literal),
                None => return Err(JPathError::unexpected_character(IN_QUERY, c)),
            },
        };
        self.eat_whitespace();
        self.current(OPEN_QUERY)?;
        Ok(operand)
    }

    fn parse_literal(&mut self) -> Result<Option<Value>, JPathError> {
        match self.peek() {
            Some('\'') => self.read_quoted_string().map(|s| Some(Value::String(s))),
            Some('/') => self.read_regex().map(|s| Some(Value::String(s))),
            _ => Ok(self.run(scalar_literal)),
        }
    }

    /// Reads `/pattern/flags` verbatim.
    fn read_regex(&mut self) -> Result<String, JPathError> {
        let start = self.pos;
        self.bump();
        while let Some(c) = self.peek() {
            self.bump();
            match c {
                '\\' => self.bump(),
                '/' => {
                    self.run(take_while(char::is_alphabetic));
                    return Ok(self.text[start..self.pos].to_string());
                }
                _ => {}
            }
        }
        Err(JPathError::syntax(OPEN_REGEX))
    }

    fn parse_operator(&mut self) -> Result<QueryOperator, JPathError> {
        if self.rest().chars().nth(1).is_none() {
            return Err(JPathError::syntax(OPEN_QUERY));
        }
        self.run(query_operator)
            .ok_or_else(|| JPathError::syntax("Could not read query operator."))
    }
}

fn member_step(member: &str, scan: bool) -> PathStep {
    let name = (member != "*").then(|| member.to_string());
    if scan {
        PathStep::Scan(name)
    } else {
        PathStep::Field(name)
    }
}

fn is_query_terminator(c: char) -> bool {
    matches!(c, '=' | '<' | '!' | '>' | '|' | '&')
}

fn is_member_delimiter(c: char, in_query: bool) -> bool {
    matches!(c, '.' | '[' | ']' | ')' | ' ') || (in_query && is_query_terminator(c))
}

fn combine(operator: CompositeOperator, mut expressions: Vec<QueryExpression>) -> QueryExpression {
    if expressions.len() == 1 {
        expressions.swap_remove(0)
    } else {
        QueryExpression::Composite {
            operator,
            expressions,
        }
    }
}

fn parse_index(text: &str) -> Result<i64, JPathError> {
    if text.is_empty() {
        return Err(JPathError::syntax("Array index expected."));
    }
    let parsed: IResult<&str, i64> = all_consuming(nom_i64).parse(text);
    parsed
        .map(|(_, index)| index)
        .map_err(|_| JPathError::syntax(format!("Invalid array index: {text}")))
}

// --- Token Combinators ---

fn query_operator(input: &str) -> IResult<&str, QueryOperator> {
    alt((
        value(QueryOperator::StrictEquals, tag("===")),
        value(QueryOperator::Equals, tag("==")),
        value(QueryOperator::RegexEquals, tag("=~")),
        value(QueryOperator::StrictNotEquals, tag("!==")),
        value(QueryOperator::NotEquals, tag("!=")),
        value(QueryOperator::NotEquals, tag("<>")),
        value(QueryOperator::LessThanOrEquals, tag("<=")),
        value(QueryOperator::LessThan, tag("<")),
        value(QueryOperator::GreaterThanOrEquals, tag(">=")),
        value(QueryOperator::GreaterThan, tag(">")),
    ))
    .parse(input)
}

fn number_literal(input: &str) -> IResult<&str, Value> {
    alt((
        map(terminated(nom_i64, not(one_of(".eE"))), Value::from),
        map_res(recognize_float, |text: &str| text.parse::<f64>().map(Value::from)),
    ))
    .parse(input)
}

fn scalar_literal(input: &str) -> IResult<&str, Value> {
    alt((
        number_literal,
        value(Value::Bool(true), tag("true")),
        value(Value::Bool(false), tag("false")),
        value(Value::Null, tag("null")),
    ))
    .parse(input)
}
