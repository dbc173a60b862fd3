use crate::{
    base::{identifier, keyword, kind, punctuator},
    statement::match_function_body,
    Failure, Match, ParseResult, ParseResultExt,
};
use ast::{Function, Import, ImportBindings, ImportItem, Item, Parameter, Parameters, Posh};
use lexer::{Token, TokenKind};

/// Match a whole compilation unit up to and including the end of input.
pub fn match_posh(tokens: &[Token], offset: usize) -> ParseResult<'_, Posh> {
    let mut end = offset;
    let mut items = Vec::new();

    loop {
        let item = first_of!(tokens, end;
            match_function(tokens, end).map_node(Item::Function),
            match_import(tokens, end).map_node(Item::Import),
        );

        match item {
            Ok(item) => {
                items.push(item.node);
                end = item.end;
            }
            Err(failure) => {
                end = end_of_input(tokens, end).map_err(|error| failure.furthest(error))?;
                break;
            }
        }
    }

    Ok(Match::new(Posh { items }, offset, end))
}

/// The offset past the end-of-input token if it is found at the given offset.
fn end_of_input(tokens: &[Token], offset: usize) -> Result<usize, Failure<'_>> {
    match tokens.get(offset) {
        Some(token) if token.kind == TokenKind::EndOfInput => Ok(offset + 1),
        _ => Err(Failure::at(tokens, offset)),
    }
}

pub fn match_function(tokens: &[Token], offset: usize) -> ParseResult<'_, Function> {
    let fn_ = keyword(tokens, offset, "fn")?;
    let name = identifier(tokens, fn_.end)?;
    let parameters = match_parameters(tokens, name.end)?;
    let mut end = parameters.end;

    let return_type = if name.node.image == utility::PROGRAM_ENTRY {
        None
    } else {
        let return_type = identifier(tokens, end)?;
        end = return_type.end;
        Some(return_type.node)
    };

    let body = match_function_body(tokens, end)?;

    Ok(Match::new(
        Function {
            name: name.node,
            parameters: parameters.node,
            return_type,
            body: body.node,
        },
        offset,
        body.end,
    ))
}

/// Match a parenthesized list of parameters each consisting of a name and a type.
///
/// Separating commas are optional.
pub fn match_parameters(tokens: &[Token], offset: usize) -> ParseResult<'_, Parameters> {
    let mut end = punctuator(tokens, offset, "(")?.end;
    let mut parameters = Vec::new();

    loop {
        if let Ok(closing) = punctuator(tokens, end, ")") {
            end = closing.end;
            break;
        }

        let name = identifier(tokens, end)?;
        let type_ = identifier(tokens, name.end)?;
        end = type_.end;

        parameters.push(Parameter {
            name: name.node,
            type_: type_.node,
        });

        if let Ok(comma) = punctuator(tokens, end, ",") {
            end = comma.end;
        }
    }

    Ok(Match::new(Parameters { parameters }, offset, end))
}

pub fn match_import(tokens: &[Token], offset: usize) -> ParseResult<'_, Import> {
    let from = keyword(tokens, offset, "from")?;
    let path = kind(tokens, from.end, TokenKind::String)?;
    let import = keyword(tokens, path.end, "import")?;

    let bindings = first_of!(tokens, import.end;
        match_import_all(tokens, import.end),
        match_import_items(tokens, import.end),
    )?;

    Ok(Match::new(
        Import {
            path: path.node.clone(),
            bindings: bindings.node,
        },
        offset,
        bindings.end,
    ))
}

fn match_import_all(tokens: &[Token], offset: usize) -> ParseResult<'_, ImportBindings> {
    let asterisk = punctuator(tokens, offset, "*")?;
    let as_ = keyword(tokens, asterisk.end, "as")?;
    let alias = identifier(tokens, as_.end)?;

    Ok(Match::new(
        ImportBindings::All { alias: alias.node },
        offset,
        alias.end,
    ))
}

fn match_import_items(tokens: &[Token], offset: usize) -> ParseResult<'_, ImportBindings> {
    let first = match_import_item(tokens, offset)?;
    let mut end = first.end;
    let mut items = vec![first.node];

    while let Ok(comma) = punctuator(tokens, end, ",") {
        let item = match_import_item(tokens, comma.end)?;
        items.push(item.node);
        end = item.end;
    }

    Ok(Match::new(ImportBindings::Items(items), offset, end))
}

fn match_import_item(tokens: &[Token], offset: usize) -> ParseResult<'_, ImportItem> {
    let name = identifier(tokens, offset)?;

    Ok(match keyword(tokens, name.end, "as") {
        Ok(as_) => {
            let alias = identifier(tokens, as_.end)?;
            Match::new(
                ImportItem {
                    name: name.node,
                    alias: Some(alias.node),
                },
                offset,
                alias.end,
            )
        }
        Err(_) => Match::new(
            ImportItem {
                name: name.node,
                alias: None,
            },
            offset,
            name.end,
        ),
    })
}
