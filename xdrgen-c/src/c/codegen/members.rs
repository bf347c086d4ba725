//! C forms of XDR declarations: the member text, the codec statements and the
//! maxsize term. Shared by structs, pointers, unions and typedefs.

use indoc::indoc;
use parser::ast as xdr;
use parser::ast::declaration::Which;

use super::*;

/// The member as it appears inside a struct body or after `typedef`, without the `;`.
pub(crate) fn codegen_member(decl: &xdr::Declaration) -> Option<String> {
    let name = c_ident(decl.name());

    Some(
        match decl.which() {
            Which::Basic(spec) => format!("{} {}", c_type(spec), name),
            Which::FixedArray { spec, size } => format!("{} {}[{}]", c_type(spec), name, c_value(size)),
            Which::VariableArray { spec, .. } => {
                indoc!("
                    struct {
                        u32 count;
                        #TYPE *element;
                    } #NAME"
                )
                .replace("#TYPE", &c_type(spec))
                .replace("#NAME", &name)
            },
            Which::FixedOpaque { size } => format!("u8 {}[{}]", name, c_value(size)),
            Which::VariableOpaque { .. } => format!("opaque {}", name),
            Which::String { .. } => format!("string {}", name),
            Which::Optional(spec) => format!("{} *{}", c_type(spec), name),
            Which::Void => return None
        }
    )
}

/// `&x`, except that a dereference `(*p)` collapses back to `p`.
fn address_of(lvalue: &str) -> String {
    if lvalue.starts_with("(*") && lvalue.ends_with(')') {
        lvalue[2..lvalue.len() - 1].to_string()
    } else {
        format!("&{}", lvalue)
    }
}

fn encode_argument(spec: &xdr::TypeSpecifier, lvalue: &str) -> String {
    if is_passed_by_value(spec) {
        lvalue.to_string()
    } else {
        address_of(lvalue)
    }
}

fn codegen_bound_check(length: &str, maxsize: &Option<xdr::Value>) -> Option<String> {
    maxsize.as_ref().map(|max| {
        indoc!("
            if (#LENGTH > #MAX)
                return false;"
        )
        .replace("#LENGTH", length)
        .replace("#MAX", &c_value(max))
    })
}

fn codegen_decode_call(spec: &xdr::TypeSpecifier, pointer: &str) -> String {
    indoc!("
        if (!xdrgen_decode_#TYPE(xdr, #PTR))
            return false;"
    )
    .replace("#TYPE", spec.type_name())
    .replace("#PTR", pointer)
}

fn codegen_encode_call(spec: &xdr::TypeSpecifier, argument: &str) -> String {
    indoc!("
        if (!xdrgen_encode_#TYPE(xdr, #ARG))
            return false;"
    )
    .replace("#TYPE", spec.type_name())
    .replace("#ARG", argument)
}

fn codegen_loop(count: &str, statement: String) -> String {
    indoc!("
        for (u32 i = 0; i < #COUNT; i++) {
        #STATEMENT
        }"
    )
    .replace("#COUNT", count)
    .replace("#STATEMENT", indent(&statement).trim_end())
}

/// Statements that decode `decl` into `lvalue`, e.g. `ptr->field` or `(*ptr)`.
pub(crate) fn codegen_decoder_statements(decl: &xdr::Declaration, lvalue: &str) -> Vec<String> {
    match decl.which() {
        Which::Basic(spec) => vec!(codegen_decode_call(spec, &address_of(lvalue))),
        Which::FixedArray { spec, size } => vec!(
            codegen_loop(&c_value(size), codegen_decode_call(spec, &format!("&{}[i]", lvalue)))
        ),
        Which::VariableArray { spec, maxsize } => {
            let count = format!("{}.count", lvalue);
            let mut statements = vec!(
                indoc!("
                    if (xdr_stream_decode_u32(xdr, &#COUNT) < 0)
                        return false;"
                )
                .replace("#COUNT", &count)
            );
            statements.extend(codegen_bound_check(&count, maxsize));
            statements.push(codegen_loop(&count, codegen_decode_call(spec, &format!("&{}.element[i]", lvalue))));
            statements
        },
        Which::FixedOpaque { size } => vec!(
            indoc!("
                if (xdr_stream_decode_opaque_fixed(xdr, #LVALUE, #SIZE) < 0)
                    return false;"
            )
            .replace("#LVALUE", lvalue)
            .replace("#SIZE", &c_value(size))
        ),
        Which::VariableOpaque { maxsize } | Which::String { maxsize } => {
            let kind = if let Which::String { .. } = decl.which() { "string" } else { "opaque" };
            vec!(
                indoc!("
                    if (!xdrgen_decode_#KIND(xdr, #PTR, #MAX))
                        return false;"
                )
                .replace("#KIND", kind)
                .replace("#PTR", &address_of(lvalue))
                .replace("#MAX", &maxsize.as_ref().map(c_value).unwrap_or_else(|| String::from("0")))
            )
        },
        Which::Optional(spec) => vec!(
            indoc!("
                {
                    bool opted;

                    if (!xdrgen_decode_bool(xdr, &opted))
                        return false;
                    if (!opted)
                        #LVALUE = NULL;
                    else if (!xdrgen_decode_#TYPE(xdr, #LVALUE))
                        return false;
                }"
            )
            .replace("#LVALUE", lvalue)
            .replace("#TYPE", spec.type_name())
        ),
        Which::Void => vec!()
    }
}

/// Statements that encode the value at `lvalue` as `decl`.
pub(crate) fn codegen_encoder_statements(decl: &xdr::Declaration, lvalue: &str) -> Vec<String> {
    match decl.which() {
        Which::Basic(spec) => vec!(codegen_encode_call(spec, &encode_argument(spec, lvalue))),
        Which::FixedArray { spec, size } => vec!(
            codegen_loop(&c_value(size), codegen_encode_call(spec, &encode_argument(spec, &format!("{}[i]", lvalue))))
        ),
        Which::VariableArray { spec, maxsize } => {
            let count = format!("{}.count", lvalue);
            let mut statements = vec!();
            statements.extend(codegen_bound_check(&count, maxsize));
            statements.push(
                indoc!("
                    if (xdr_stream_encode_u32(xdr, #COUNT) != XDR_UNIT)
                        return false;"
                )
                .replace("#COUNT", &count)
            );
            let element = format!("{}.element[i]", lvalue);
            statements.push(codegen_loop(&count, codegen_encode_call(spec, &encode_argument(spec, &element))));
            statements
        },
        Which::FixedOpaque { size } => vec!(
            indoc!("
                if (xdr_stream_encode_opaque_fixed(xdr, #LVALUE, #SIZE) < 0)
                    return false;"
            )
            .replace("#LVALUE", lvalue)
            .replace("#SIZE", &c_value(size))
        ),
        Which::VariableOpaque { maxsize } | Which::String { maxsize } => {
            let kind = if let Which::String { .. } = decl.which() { "string" } else { "opaque" };
            let mut statements = vec!();
            statements.extend(codegen_bound_check(&format!("{}.len", lvalue), maxsize));
            statements.push(
                indoc!("
                    if (!xdrgen_encode_#KIND(xdr, #LVALUE))
                        return false;"
                )
                .replace("#KIND", kind)
                .replace("#LVALUE", lvalue)
            );
            statements
        },
        Which::Optional(spec) => {
            let pointee = if is_passed_by_value(spec) { format!("*{}", lvalue) } else { lvalue.to_string() };
            vec!(
                indoc!("
                    if (!xdrgen_encode_bool(xdr, #LVALUE != NULL))
                        return false;
                    if (#LVALUE != NULL && !xdrgen_encode_#TYPE(xdr, #POINTEE))
                        return false;"
                )
                .replace("#LVALUE", lvalue)
                .replace("#TYPE", spec.type_name())
                .replace("#POINTEE", &pointee)
            )
        },
        Which::Void => vec!()
    }
}

/// Upper bound, in XDR units, of the wire size of `decl`. `None` for `void`.
///
/// Variable-length items without a bound count only their length word. An
/// optional link back to `owner` counts only its presence flag.
pub(crate) fn maxsize_term(ctx: &Context, decl: &xdr::Declaration, owner: &str) -> Option<String> {
    Some(
        match decl.which() {
            Which::Basic(spec) => maxsize_of(ctx, spec),
            Which::FixedArray { spec, size } => format!("{} * {}", c_value(size), maxsize_of(ctx, spec)),
            Which::VariableArray { spec, maxsize: Some(max) } => {
                format!("XDR_unsigned_int + {} * {}", c_value(max), maxsize_of(ctx, spec))
            },
            Which::FixedOpaque { size } => format!("XDR_QUADLEN({})", c_value(size)),
            Which::VariableOpaque { maxsize: Some(max) } | Which::String { maxsize: Some(max) } => {
                format!("XDR_unsigned_int + XDR_QUADLEN({})", c_value(max))
            },
            Which::VariableArray { maxsize: None, .. }
            | Which::VariableOpaque { maxsize: None }
            | Which::String { maxsize: None } => String::from("XDR_unsigned_int"),
            Which::Optional(spec) if spec.type_name() == owner => String::from("XDR_bool"),
            Which::Optional(spec) => format!("XDR_bool + {}", maxsize_of(ctx, spec)),
            Which::Void => return None
        }
    )
}
