//! Flat arithmetic evaluator backing the `calculate` tool: `+ - * /` with
//! the usual precedence, no parentheses. Numbers may carry a unary sign
//! (`-5`, `2--3`). Shared by the demos and the integration tests.

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Op(char),
}

fn tokenize(expr: &str) -> Result<Vec<Token>, String> {
    let bytes = expr.as_bytes();
    let mut tokens: Vec<Token> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        // A sign at the start or right after an operator binds to the number
        let expects_number = matches!(tokens.last(), None | Some(Token::Op(_)));
        if matches!(c, '+' | '-' | '*' | '/') && !(expects_number && matches!(c, '+' | '-')) {
            tokens.push(Token::Op(c));
            i += 1;
            continue;
        }
        let start = i;
        if matches!(c, '+' | '-') {
            i += 1;
        }
        while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
            i += 1;
        }
        if i == start || &expr[start..i] == "+" || &expr[start..i] == "-" {
            return Err(format!("unexpected character '{}'", c));
        }
        let value: f64 = expr[start..i]
            .parse()
            .map_err(|_| format!("not a number: '{}'", &expr[start..i]))?;
        tokens.push(Token::Number(value));
    }
    Ok(tokens)
}

/// Evaluate a flat arithmetic expression, e.g. `"12*7"` or `"2 + -3"`.
pub fn eval_expression(expr: &str) -> Result<f64, String> {
    let tokens = tokenize(expr)?;
    let mut iter = tokens.iter().copied();

    let mut product = match iter.next() {
        Some(Token::Number(n)) => n,
        _ => return Err("expected a number".to_string()),
    };
    let mut total = 0.0;
    let mut additive = '+';

    loop {
        let op = match iter.next() {
            Some(Token::Op(op)) => op,
            None => break,
            Some(other) => return Err(format!("expected an operator, got {:?}", other)),
        };
        let n = match iter.next() {
            Some(Token::Number(n)) => n,
            _ => return Err("expected a number after the operator".to_string()),
        };
        match op {
            '*' => product *= n,
            '/' if n == 0.0 => return Err("division by zero".to_string()),
            '/' => product /= n,
            _ => {
                if additive == '+' {
                    total += product;
                } else {
                    total -= product;
                }
                additive = op;
                product = n;
            }
        }
    }

    if additive == '+' {
        total += product;
    } else {
        total -= product;
    }
    Ok(total)
}
