use crate::{
    base::{self, identifier, keyword, kind, punctuator},
    Failure, Match, ParseResult, ParseResultExt,
};
use ast::{
    Argument, Arithmetic, ArithmeticOperand, ArithmeticOperator, Boolean, Callee, Comparison,
    ComparisonOperator, DotNotation, Expression, Flag, FunctionCall, Logical, LogicalOperator,
    Negation, Numeric, Pipe, Range, SimpleExpression,
};
use lexer::{Token, TokenKind};

pub fn match_expression(tokens: &[Token], offset: usize) -> ParseResult<'_, Expression> {
    first_of!(tokens, offset;
        match_pipe(tokens, offset).map_node(Expression::Pipe),
        match_range(tokens, offset).map_node(Expression::Range),
        match_simple_expression(tokens, offset).map_node(Expression::Simple),
    )
}

pub fn match_simple_expression(
    tokens: &[Token],
    offset: usize,
) -> ParseResult<'_, SimpleExpression> {
    first_of!(tokens, offset;
        match_arithmetic(tokens, offset)
            .map_node(|arithmetic| SimpleExpression::Arithmetic(Box::new(arithmetic))),
        match_function_call(tokens, offset).map_node(SimpleExpression::Call),
        match_numeric(tokens, offset).map_node(SimpleExpression::Numeric),
        kind(tokens, offset, TokenKind::String)
            .map_node(|text| SimpleExpression::String(text.clone())),
        match_boolean(tokens, offset).map_node(SimpleExpression::Boolean),
    )
}

/// Match a pipe of at least one stage.
pub fn match_pipe(tokens: &[Token], offset: usize) -> ParseResult<'_, Pipe> {
    let source = match_simple_expression(tokens, offset)?;
    let mut end = source.end;
    let mut stages = Vec::new();

    let failure = loop {
        let bar = match punctuator(tokens, end, "|") {
            Ok(bar) => bar,
            Err(failure) => break failure,
        };
        let stage = match match_function_call(tokens, bar.end) {
            Ok(stage) => stage,
            Err(failure) => break failure,
        };

        stages.push(stage.node);
        end = stage.end;
    };

    if stages.is_empty() {
        return Err(failure);
    }

    Ok(Match::new(
        Pipe {
            source: source.node,
            stages,
        },
        offset,
        end,
    ))
}

pub fn match_range(tokens: &[Token], offset: usize) -> ParseResult<'_, Range> {
    let start = match_numeric(tokens, offset)?;
    let mut end = start.end;

    let step = match punctuator(tokens, end, ",") {
        Ok(comma) => {
            let step = match_numeric(tokens, comma.end)?;
            end = step.end;
            Some(step.node)
        }
        Err(_) => None,
    };

    end = punctuator(tokens, end, ".")?.end;
    end = punctuator(tokens, end, ".")?.end;

    let stop = match match_numeric(tokens, end) {
        Ok(stop) => {
            end = stop.end;
            Some(stop.node)
        }
        Err(_) => None,
    };

    Ok(Match::new(
        Range {
            start: start.node,
            step,
            end: stop,
        },
        offset,
        end,
    ))
}

/// Match a left-leaning chain of at least one arithmetic operation.
pub fn match_arithmetic(tokens: &[Token], offset: usize) -> ParseResult<'_, Arithmetic> {
    let first = match_numeric(tokens, offset)?;
    let mut left = ArithmeticOperand::Numeric(first.node);
    let mut end = first.end;

    let failure = loop {
        let operator = match match_arithmetic_operator(tokens, end) {
            Ok(operator) => operator,
            Err(failure) => break failure,
        };
        let right = match match_numeric(tokens, operator.end) {
            Ok(right) => right,
            Err(failure) => break failure,
        };

        left = ArithmeticOperand::Arithmetic(Box::new(Arithmetic {
            left,
            operator: operator.node,
            right: right.node,
        }));
        end = right.end;
    };

    match left {
        ArithmeticOperand::Arithmetic(arithmetic) => Ok(Match::new(*arithmetic, offset, end)),
        ArithmeticOperand::Numeric(_) => Err(failure),
    }
}

fn match_arithmetic_operator(
    tokens: &[Token],
    offset: usize,
) -> ParseResult<'_, ArithmeticOperator> {
    let token = base::token(tokens, offset);

    let operator = match token.image.as_str() {
        "+" => ArithmeticOperator::Add,
        "-" => ArithmeticOperator::Subtract,
        "*" => ArithmeticOperator::Multiply,
        "/" => ArithmeticOperator::Divide,
        _ => return Err(Failure { token }),
    };

    punctuator(tokens, offset, &token.image).map_node(|_| operator)
}

/// Match a chain of at least one comparison.
///
/// A chain like `a < b < c` is folded into the conjunction `(a < b) and (b < c)`.
pub fn match_comparison(tokens: &[Token], offset: usize) -> ParseResult<'_, Boolean> {
    let first = match_numeric(tokens, offset)?;
    let mut left = first.node;
    let mut end = first.end;
    let mut chain: Option<Boolean> = None;

    let failure = loop {
        let operator = match match_comparison_operator(tokens, end) {
            Ok(operator) => operator,
            Err(failure) => break failure,
        };
        let right = match match_numeric(tokens, operator.end) {
            Ok(right) => right,
            Err(failure) => break failure,
        };

        let comparison = Boolean::Comparison(Box::new(Comparison {
            left,
            operator: operator.node,
            right: right.node.clone(),
        }));

        chain = Some(match chain {
            Some(chain) => Boolean::Logical(Box::new(Logical {
                left: chain,
                operator: LogicalOperator::And,
                right: comparison,
            })),
            None => comparison,
        });
        left = right.node;
        end = right.end;
    };

    match chain {
        Some(chain) => Ok(Match::new(chain, offset, end)),
        None => Err(failure),
    }
}

fn match_comparison_operator(
    tokens: &[Token],
    offset: usize,
) -> ParseResult<'_, ComparisonOperator> {
    first_of!(tokens, offset;
        two_character_operator(tokens, offset, "<", ComparisonOperator::LessOrEqual),
        two_character_operator(tokens, offset, ">", ComparisonOperator::GreaterOrEqual),
        two_character_operator(tokens, offset, "=", ComparisonOperator::Equal),
        two_character_operator(tokens, offset, "!", ComparisonOperator::NotEqual),
        punctuator(tokens, offset, "<").map_node(|_| ComparisonOperator::Less),
        punctuator(tokens, offset, ">").map_node(|_| ComparisonOperator::Greater),
    )
}

/// Match an operator consisting of the given punctuator followed by `=`.
fn two_character_operator<'t>(
    tokens: &'t [Token],
    offset: usize,
    first: &str,
    operator: ComparisonOperator,
) -> ParseResult<'t, ComparisonOperator> {
    let first = punctuator(tokens, offset, first)?;
    let second = punctuator(tokens, first.end, "=")?;

    Ok(Match::new(operator, offset, second.end))
}

pub fn match_logical(tokens: &[Token], offset: usize) -> ParseResult<'_, Logical> {
    let left = match_boolean(tokens, offset)?;

    let operator = first_of!(tokens, left.end;
        keyword(tokens, left.end, "and").map_node(|_| LogicalOperator::And),
        keyword(tokens, left.end, "or").map_node(|_| LogicalOperator::Or),
    )?;

    // a logical right-hand side is tried first to allow chains like `a and b or c`
    let right = first_of!(tokens, operator.end;
        match_logical(tokens, operator.end).map_node(|logical| Boolean::Logical(Box::new(logical))),
        match_boolean(tokens, operator.end),
    )?;

    Ok(Match::new(
        Logical {
            left: left.node,
            operator: operator.node,
            right: right.node,
        },
        offset,
        right.end,
    ))
}

pub fn match_boolean(tokens: &[Token], offset: usize) -> ParseResult<'_, Boolean> {
    first_of!(tokens, offset;
        match_comparison(tokens, offset),
        match_negation(tokens, offset)
            .map_node(|negation| Boolean::Negation(Box::new(negation))),
        match_numeric(tokens, offset).map_node(Boolean::Numeric),
        keyword(tokens, offset, "true").map_node(|_| Boolean::Literal(true)),
        keyword(tokens, offset, "false").map_node(|_| Boolean::Literal(false)),
    )
}

pub fn match_negation(tokens: &[Token], offset: usize) -> ParseResult<'_, Negation> {
    let not = keyword(tokens, offset, "not")?;
    let operand = match_boolean(tokens, not.end)?;

    Ok(Match::new(
        Negation {
            operand: operand.node,
        },
        offset,
        operand.end,
    ))
}

pub fn match_numeric(tokens: &[Token], offset: usize) -> ParseResult<'_, Numeric> {
    first_of!(tokens, offset;
        match_wrapped_arithmetic(tokens, offset)
            .map_node(|arithmetic| Numeric::Wrapped(Box::new(arithmetic))),
        match_dot_notation(tokens, offset).map_node(Numeric::DotNotation),
        kind(tokens, offset, TokenKind::Integer).map_node(|token| Numeric::Integer(token.clone())),
        kind(tokens, offset, TokenKind::Float).map_node(|token| Numeric::Float(token.clone())),
        identifier(tokens, offset).map_node(Numeric::Identifier),
    )
}

fn match_wrapped_arithmetic(tokens: &[Token], offset: usize) -> ParseResult<'_, Arithmetic> {
    let opening = punctuator(tokens, offset, "(")?;
    let arithmetic = match_arithmetic(tokens, opening.end)?;
    let closing = punctuator(tokens, arithmetic.end, ")")?;

    Ok(Match::new(arithmetic.node, offset, closing.end))
}

/// Match a path of at least two segments.
pub fn match_dot_notation(tokens: &[Token], offset: usize) -> ParseResult<'_, DotNotation> {
    let head = identifier(tokens, offset)?;
    let mut segments = vec![head.node];
    let mut end = head.end;

    let failure = loop {
        let dot = match punctuator(tokens, end, ".") {
            Ok(dot) => dot,
            Err(failure) => break failure,
        };
        let segment = match identifier(tokens, dot.end) {
            Ok(segment) => segment,
            Err(failure) => break failure,
        };

        segments.push(segment.node);
        end = segment.end;
    };

    if segments.len() < 2 {
        return Err(failure);
    }

    Ok(Match::new(DotNotation { segments }, offset, end))
}

pub fn match_function_call(tokens: &[Token], offset: usize) -> ParseResult<'_, FunctionCall> {
    let callee = first_of!(tokens, offset;
        match_dot_notation(tokens, offset).map_node(Callee::DotNotation),
        identifier(tokens, offset).map_node(Callee::Identifier),
    )?;

    let mut end = punctuator(tokens, callee.end, "(")?.end;
    let mut arguments = Vec::new();

    loop {
        if let Ok(closing) = punctuator(tokens, end, ")") {
            end = closing.end;
            break;
        }

        let argument = first_of!(tokens, end;
            match_simple_expression(tokens, end).map_node(Argument::Expression),
            match_flag(tokens, end).map_node(Argument::Flag),
        )?;
        arguments.push(argument.node);
        end = argument.end;

        if let Ok(comma) = punctuator(tokens, end, ",") {
            end = comma.end;
        }
    }

    Ok(Match::new(
        FunctionCall {
            callee: callee.node,
            arguments,
        },
        offset,
        end,
    ))
}

pub fn match_flag(tokens: &[Token], offset: usize) -> ParseResult<'_, Flag> {
    let mut end = punctuator(tokens, offset, "-")?.end;

    let long = match punctuator(tokens, end, "-") {
        Ok(dash) => {
            end = dash.end;
            true
        }
        Err(_) => false,
    };

    let name = identifier(tokens, end)?;

    Ok(Match::new(
        Flag {
            long,
            name: name.node,
        },
        offset,
        name.end,
    ))
}
