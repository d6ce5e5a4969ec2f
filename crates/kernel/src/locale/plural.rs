//! Gettext `Plural-Forms` rules.
//!
//! Parses headers such as `nplurals=3; plural=(n==1 ? 0 : n%10>=2 &&
//! n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);` into an expression that
//! maps a quantity to a plural form index.

use std::iter::Peekable;
use std::str::Chars;

/// Nesting limit for parenthesized or unary sub-expressions.
const MAX_DEPTH: usize = 32;

/// A parsed plural rule for one catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralRule {
    nplurals: usize,
    expr: Expr,
}

impl PluralRule {
    /// Parse the value of a `Plural-Forms` header.
    ///
    /// Returns None when `nplurals` is missing or zero, or when the
    /// `plural` expression does not parse.
    pub fn parse(header: &str) -> Option<Self> {
        let mut nplurals = None;
        let mut expr = None;

        for part in header.split(';') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            match key.trim() {
                "nplurals" => nplurals = value.trim().parse::<usize>().ok(),
                "plural" => expr = Parser::parse(value),
                _ => {}
            }
        }

        let nplurals = nplurals.filter(|n| *n > 0)?;
        Some(Self {
            nplurals,
            expr: expr?,
        })
    }

    /// Find the `Plural-Forms` header in raw .po file contents.
    pub fn from_po(content: &str) -> Option<Self> {
        let start = content.find("Plural-Forms:")? + "Plural-Forms:".len();
        let rest = &content[start..];
        let end = rest.find("\\n").or_else(|| rest.find('"')).unwrap_or(rest.len());
        Self::parse(&rest[..end])
    }

    pub fn nplurals(&self) -> usize {
        self.nplurals
    }

    /// Plural form index for quantity `n`, clamped to the declared count.
    pub fn index(&self, n: u64) -> usize {
        let index = usize::try_from(self.expr.eval(n)).unwrap_or(usize::MAX);
        index.min(self.nplurals - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    N,
    Num(u64),
    Not(Box<Expr>),
    Binary(Op, Box<Expr>, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl Expr {
    fn eval(&self, n: u64) -> u64 {
        match self {
            Expr::N => n,
            Expr::Num(v) => *v,
            Expr::Not(e) => u64::from(e.eval(n) == 0),
            Expr::Ternary(cond, then, other) => {
                if cond.eval(n) != 0 {
                    then.eval(n)
                } else {
                    other.eval(n)
                }
            }
            Expr::Binary(op, l, r) => {
                let (a, b) = (l.eval(n), r.eval(n));
                match op {
                    Op::Or => u64::from(a != 0 || b != 0),
                    Op::And => u64::from(a != 0 && b != 0),
                    Op::Eq => u64::from(a == b),
                    Op::Ne => u64::from(a != b),
                    Op::Lt => u64::from(a < b),
                    Op::Le => u64::from(a <= b),
                    Op::Gt => u64::from(a > b),
                    Op::Ge => u64::from(a >= b),
                    Op::Add => a.saturating_add(b),
                    Op::Sub => a.saturating_sub(b),
                    Op::Mul => a.saturating_mul(b),
                    Op::Div => a.checked_div(b).unwrap_or(0),
                    Op::Rem => a.checked_rem(b).unwrap_or(0),
                }
            }
        }
    }
}

/// Recursive-descent parser over the C subset gettext uses.
struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn parse(source: &'a str) -> Option<Expr> {
        let mut parser = Parser {
            chars: source.chars().peekable(),
            depth: 0,
        };
        let expr = parser.ternary()?;
        parser.skip_ws();
        parser.chars.peek().is_none().then_some(expr)
    }

    fn skip_ws(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    /// Consume `token` if it comes next.
    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        let mut ahead = self.chars.clone();
        for expected in token.chars() {
            if ahead.next() != Some(expected) {
                return false;
            }
        }
        // `<` must not swallow the first half of `<=`, and so on
        if matches!(token, "<" | ">" | "!") && ahead.peek() == Some(&'=') {
            return false;
        }
        self.chars = ahead;
        true
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn ternary(&mut self) -> Option<Expr> {
        let cond = self.binary(0)?;
        if !self.eat("?") {
            return Some(cond);
        }
        let then = self.nested(Self::ternary)?;
        if !self.eat(":") {
            return None;
        }
        let other = self.nested(Self::ternary)?;
        Some(Expr::Ternary(Box::new(cond), Box::new(then), Box::new(other)))
    }

    /// Binary operators by precedence level, loosest first.
    fn binary(&mut self, level: usize) -> Option<Expr> {
        const LEVELS: &[&[(&str, Op)]] = &[
            &[("||", Op::Or)],
            &[("&&", Op::And)],
            &[("==", Op::Eq), ("!=", Op::Ne)],
            &[("<=", Op::Le), (">=", Op::Ge), ("<", Op::Lt), (">", Op::Gt)],
            &[("+", Op::Add), ("-", Op::Sub)],
            &[("*", Op::Mul), ("/", Op::Div), ("%", Op::Rem)],
        ];

        let Some(ops) = LEVELS.get(level) else {
            return self.unary();
        };

        let mut left = self.binary(level + 1)?;
        'outer: loop {
            for (token, op) in ops.iter() {
                if self.eat(token) {
                    let right = self.binary(level + 1)?;
                    left = Expr::Binary(*op, Box::new(left), Box::new(right));
                    continue 'outer;
                }
            }
            return Some(left);
        }
    }

    fn unary(&mut self) -> Option<Expr> {
        if self.eat("!") {
            let inner = self.nested(Self::unary)?;
            return Some(Expr::Not(Box::new(inner)));
        }
        if self.eat("(") {
            let inner = self.nested(Self::ternary)?;
            return self.eat(")").then_some(inner);
        }

        self.skip_ws();
        match self.chars.peek().copied() {
            Some('n') => {
                self.chars.next();
                Some(Expr::N)
            }
            Some(c) if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(d) = self.chars.peek().copied().filter(char::is_ascii_digit) {
                    digits.push(d);
                    self.chars.next();
                }
                digits.parse().ok().map(Expr::Num)
            }
            _ => None,
        }
    }
}
