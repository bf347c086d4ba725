use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "xdr.pest"]
pub struct XdrParser;

/// Keyword and punctuation tokens carry no information once the tree is built.
pub fn is_token(rule: Rule) -> bool {
    match rule {
        Rule::kw_bool | Rule::kw_case | Rule::kw_const | Rule::kw_default | Rule::kw_double
        | Rule::kw_enum | Rule::kw_float | Rule::kw_hyper | Rule::kw_int | Rule::kw_long
        | Rule::kw_opaque | Rule::kw_pragma | Rule::kw_program | Rule::kw_quadruple
        | Rule::kw_string | Rule::kw_struct | Rule::kw_switch | Rule::kw_typedef
        | Rule::kw_union | Rule::kw_unsigned | Rule::kw_version | Rule::kw_void => true,
        Rule::lbrace | Rule::rbrace | Rule::lparen | Rule::rparen | Rule::lbracket
        | Rule::rbracket | Rule::langle | Rule::rangle | Rule::semi | Rule::comma
        | Rule::colon | Rule::equals | Rule::star => true,
        _ => false
    }
}
