use crate::{
    base::{identifier, keyword, punctuator},
    expression::{match_boolean, match_expression, match_function_call, match_logical, match_range},
    Match, ParseResult, ParseResultExt,
};
use ast::{
    Assignment, Boolean, Elif, Else, ForBody, ForControl, ForLoop, FunctionBody, IfStatement,
    Iterable, ReturnStatement, Statement,
};
use lexer::Token;

/// Whether loop control statements are permitted.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Context {
    Function,
    Loop,
}

pub fn match_function_body(tokens: &[Token], offset: usize) -> ParseResult<'_, FunctionBody> {
    match_block(tokens, offset, Context::Function)
        .map_node(|statements| FunctionBody { statements })
}

pub fn match_for_body(tokens: &[Token], offset: usize) -> ParseResult<'_, ForBody> {
    match_block(tokens, offset, Context::Loop).map_node(|statements| ForBody { statements })
}

fn match_block(
    tokens: &[Token],
    offset: usize,
    context: Context,
) -> ParseResult<'_, Vec<Statement>> {
    let mut end = punctuator(tokens, offset, "{")?.end;
    let mut statements = Vec::new();

    loop {
        let statement = match match_statement(tokens, end, context) {
            Ok(statement) => statement,
            Err(failure) => {
                let closing =
                    punctuator(tokens, end, "}").map_err(|error| failure.furthest(error))?;
                end = closing.end;
                break;
            }
        };

        statements.push(statement.node);
        end = statement.end;
    }

    Ok(Match::new(statements, offset, end))
}

fn match_statement(
    tokens: &[Token],
    offset: usize,
    context: Context,
) -> ParseResult<'_, Statement> {
    let statement = first_of!(tokens, offset;
        match_assignment(tokens, offset).map_node(Statement::Assignment),
        match_function_call(tokens, offset).map_node(Statement::Call),
        match_return(tokens, offset).map_node(Statement::Return),
        match_if(tokens, offset, context).map_node(Statement::If),
        match_for_loop(tokens, offset).map_node(Statement::For),
    );

    match (statement, context) {
        (Err(failure), Context::Loop) => match_for_control(tokens, offset)
            .map_node(Statement::Control)
            .map_err(|error| failure.furthest(error)),
        (statement, _) => statement,
    }
}

fn match_for_control(tokens: &[Token], offset: usize) -> ParseResult<'_, ForControl> {
    first_of!(tokens, offset;
        keyword(tokens, offset, "break").map_node(|_| ForControl::Break),
        keyword(tokens, offset, "continue").map_node(|_| ForControl::Continue),
    )
}

pub fn match_assignment(tokens: &[Token], offset: usize) -> ParseResult<'_, Assignment> {
    let target = identifier(tokens, offset)?;
    let equals = punctuator(tokens, target.end, "=")?;
    let value = match_expression(tokens, equals.end)?;

    Ok(Match::new(
        Assignment {
            target: target.node,
            value: value.node,
        },
        offset,
        value.end,
    ))
}

/// Match a return statement with an optional value.
pub fn match_return(tokens: &[Token], offset: usize) -> ParseResult<'_, ReturnStatement> {
    let return_ = keyword(tokens, offset, "return")?;

    Ok(match match_expression(tokens, return_.end) {
        Ok(value) => Match::new(
            ReturnStatement {
                value: Some(value.node),
            },
            offset,
            value.end,
        ),
        Err(_) => Match::new(ReturnStatement { value: None }, offset, return_.end),
    })
}

pub fn match_if_statement(tokens: &[Token], offset: usize) -> ParseResult<'_, IfStatement> {
    match_if(tokens, offset, Context::Function)
}

/// Match an if statement whose bodies inherit the given context.
///
/// Inside of a loop, the branches may break out of or continue the loop.
fn match_if(tokens: &[Token], offset: usize, context: Context) -> ParseResult<'_, IfStatement> {
    let if_ = keyword(tokens, offset, "if")?;
    let condition = match_condition(tokens, if_.end)?;
    let body = match_block(tokens, condition.end, context)?;
    let mut end = body.end;

    let mut elifs = Vec::new();

    while let Ok(elif) = keyword(tokens, end, "elif") {
        let condition = match_condition(tokens, elif.end)?;
        let body = match_block(tokens, condition.end, context)?;

        elifs.push(Elif {
            condition: condition.node,
            body: FunctionBody {
                statements: body.node,
            },
        });
        end = body.end;
    }

    let else_ = match keyword(tokens, end, "else") {
        Ok(else_) => {
            let body = match_block(tokens, else_.end, context)?;
            end = body.end;

            Some(Else {
                body: FunctionBody {
                    statements: body.node,
                },
            })
        }
        Err(_) => None,
    };

    Ok(Match::new(
        IfStatement {
            condition: condition.node,
            body: FunctionBody {
                statements: body.node,
            },
            elifs,
            else_,
        },
        offset,
        end,
    ))
}

fn match_condition(tokens: &[Token], offset: usize) -> ParseResult<'_, Boolean> {
    first_of!(tokens, offset;
        match_logical(tokens, offset).map_node(|logical| Boolean::Logical(Box::new(logical))),
        match_boolean(tokens, offset),
    )
}

pub fn match_for_loop(tokens: &[Token], offset: usize) -> ParseResult<'_, ForLoop> {
    let for_ = keyword(tokens, offset, "for")?;
    let key = identifier(tokens, for_.end)?;
    let mut end = key.end;

    let value = match punctuator(tokens, end, ",") {
        Ok(comma) => {
            let value = identifier(tokens, comma.end)?;
            end = value.end;
            Some(value.node)
        }
        Err(_) => None,
    };

    let in_ = keyword(tokens, end, "in")?;

    let iterable = first_of!(tokens, in_.end;
        match_range(tokens, in_.end).map_node(Iterable::Range),
        match_expression(tokens, in_.end).map_node(Iterable::Expression),
    )?;

    let body = match_for_body(tokens, iterable.end)?;

    Ok(Match::new(
        ForLoop {
            key: key.node,
            value,
            iterable: iterable.node,
            body: body.node,
        },
        offset,
        body.end,
    ))
}
