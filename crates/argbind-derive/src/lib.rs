use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprArray, Fields, Ident, Lit, LitBool, LitStr, Result,
    Type, ext::IdentExt, meta::ParseNestedMeta, parse_macro_input, spanned::Spanned,
};

/// Implement `argbind::Args` for a struct with named fields.
///
/// Members are described in declaration order, which is also the order
/// positionals are filled in.
///
/// ```ignore
/// #[derive(argbind::Args, Default)]
/// #[args(help = ["--help", "-h"], extra_args_ok = false)]
/// struct Convert {
///     #[arg(positional)]
///     input: String,
///     #[arg(positional, rename = "OUTPUT")]
///     output: String,
///     #[arg(rename = "-j", disallow_multiflag)]
///     jobs: u32,
///     #[arg(required)]
///     format: String,
///     #[arg(skip)]
///     cache: Vec<u8>,
///     // Options may also live in a member named `__<field>`.
///     __format: argbind::FieldOptions,
/// }
/// ```
#[proc_macro_derive(Args, attributes(args, arg))]
pub fn derive_args(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_args(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct ContainerSpec {
    help_args: Option<Vec<String>>,
    extra_args_ok: Option<bool>,
    options_prefix: String,
}

impl Default for ContainerSpec {
    fn default() -> Self {
        Self {
            help_args: None,
            extra_args_ok: None,
            options_prefix: "__".to_string(),
        }
    }
}

#[derive(Default)]
struct FieldSpec {
    positional: bool,
    rename: Option<String>,
    required: bool,
    disallow_multiflag: bool,
    skip: bool,
    /// Whether any `#[arg]` key was given at all.
    declared: bool,
}

enum Member {
    Data {
        ident: Ident,
        name: String,
        spec: FieldSpec,
    },
    Options {
        ident: Ident,
        target: String,
    },
}

fn expand_args(input: DeriveInput) -> Result<proc_macro2::TokenStream> {
    let container = container_spec(&input.attrs)?;

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.ident.span(),
            "#[derive(Args)] only supports structs with named fields",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            input.ident.span(),
            "#[derive(Args)] only supports structs with named fields",
        ));
    };

    let mut members = Vec::new();
    for field in &fields.named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let name = ident.unraw().to_string();
        let spec = field_spec(&field.attrs)?;

        if is_field_options(&field.ty) {
            if spec.declared {
                return Err(syn::Error::new(
                    field.span(),
                    "options members take no #[arg] attributes",
                ));
            }
            let Some(target) = name.strip_prefix(&container.options_prefix) else {
                return Err(syn::Error::new(
                    ident.span(),
                    format!(
                        "options member `{name}` must be named `{}<field>`",
                        container.options_prefix
                    ),
                ));
            };
            members.push(Member::Options {
                target: target.to_string(),
                ident,
            });
            continue;
        }

        if spec.skip {
            continue;
        }
        members.push(Member::Data { ident, name, spec });
    }

    check_option_targets(&members)?;

    let entries: Vec<proc_macro2::TokenStream> = members.iter().flat_map(member_exprs).collect();
    let config_fn = config_fn_expr(&container);

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::argbind::Args for #ident #ty_generics #where_clause {
            #config_fn

            fn descriptors(&mut self) -> ::std::vec::Vec<::argbind::Descriptor<'_>> {
                ::std::vec![ #(#entries),* ]
            }
        }
    })
}

fn check_option_targets(members: &[Member]) -> Result<()> {
    for m in members {
        let Member::Options { ident, target } = m else {
            continue;
        };
        let data = members.iter().find_map(|other| match other {
            Member::Data { name, spec, .. } if name == target => Some(spec),
            _ => None,
        });
        match data {
            None => {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("options member `{ident}` does not match any field"),
                ));
            }
            Some(spec) if spec.declared => {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("field `{target}` already has #[arg] options"),
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn member_exprs(member: &Member) -> Vec<proc_macro2::TokenStream> {
    match member {
        Member::Data { ident, name, spec } => {
            let name = LitStr::new(name, proc_macro2::Span::call_site());
            let mut out = vec![quote! {
                ::argbind::Descriptor::field(#name, &mut self.#ident)
            }];
            if spec.declared {
                let display_name = opt_string_expr(spec.rename.as_deref());
                let positional = spec.positional;
                let required = spec.required;
                let disallow_multiflag = spec.disallow_multiflag;
                out.push(quote! {
                    ::argbind::Descriptor::options(#name, ::argbind::FieldOptions {
                        display_name: #display_name,
                        disallow_multiflag: #disallow_multiflag,
                        required: #required,
                        positional: #positional,
                    })
                });
            }
            out
        }
        Member::Options { ident, target } => {
            let target = LitStr::new(target, proc_macro2::Span::call_site());
            vec![quote! {
                ::argbind::Descriptor::options(#target, ::std::clone::Clone::clone(&self.#ident))
            }]
        }
    }
}

fn config_fn_expr(container: &ContainerSpec) -> proc_macro2::TokenStream {
    if container.help_args.is_none() && container.extra_args_ok.is_none() {
        return quote! {};
    }
    let help_args = container.help_args.as_ref().map(|args| {
        let lits: Vec<LitStr> = args
            .iter()
            .map(|s| LitStr::new(s, proc_macro2::Span::call_site()))
            .collect();
        quote! { config.help_args = ::std::vec![ #( (#lits).to_string() ),* ]; }
    });
    let extra_args_ok = container
        .extra_args_ok
        .map(|ok| quote! { config.extra_args_ok = #ok; });

    quote! {
        fn config(&self) -> ::argbind::ArgsConfig {
            let mut config = ::argbind::ArgsConfig::default();
            #help_args
            #extra_args_ok
            config
        }
    }
}

fn opt_string_expr(v: Option<&str>) -> proc_macro2::TokenStream {
    match v {
        Some(s) => {
            let lit = LitStr::new(s, proc_macro2::Span::call_site());
            quote! { ::std::option::Option::Some((#lit).to_string()) }
        }
        None => quote! { ::std::option::Option::None },
    }
}

fn is_field_options(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.qself.is_none()
        && path
            .path
            .segments
            .last()
            .is_some_and(|seg| seg.ident == "FieldOptions" && seg.arguments.is_empty())
}

fn meta_key(meta: &ParseNestedMeta<'_>) -> String {
    meta.path
        .get_ident()
        .map(|i| i.to_string())
        .unwrap_or_default()
}

fn container_spec(attrs: &[Attribute]) -> Result<ContainerSpec> {
    let mut spec = ContainerSpec::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("args")) {
        attr.parse_nested_meta(|meta| {
            match meta_key(&meta).as_str() {
                "help" => {
                    let array: ExprArray = meta.value()?.parse()?;
                    spec.help_args = Some(expect_string_array(&array)?);
                }
                "extra_args_ok" => {
                    let lit: LitBool = meta.value()?.parse()?;
                    spec.extra_args_ok = Some(lit.value());
                }
                "options_prefix" => {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(meta.error("options_prefix must not be empty"));
                    }
                    spec.options_prefix = lit.value();
                }
                other => return Err(meta.error(format!("unknown args key: {other}"))),
            }
            Ok(())
        })?;
    }

    Ok(spec)
}

fn field_spec(attrs: &[Attribute]) -> Result<FieldSpec> {
    let mut spec = FieldSpec::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("arg")) {
        attr.parse_nested_meta(|meta| {
            match meta_key(&meta).as_str() {
                "positional" => spec.positional = true,
                "required" => spec.required = true,
                "disallow_multiflag" => spec.disallow_multiflag = true,
                "skip" => spec.skip = true,
                "rename" => {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(meta.error("rename must not be empty"));
                    }
                    spec.rename = Some(lit.value());
                }
                other => return Err(meta.error(format!("unknown arg key: {other}"))),
            }
            spec.declared = true;
            Ok(())
        })?;
    }

    if spec.skip && (spec.positional || spec.required || spec.rename.is_some()) {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "skipped fields take no other #[arg] keys",
        ));
    }

    Ok(spec)
}

fn expect_string_array(array: &ExprArray) -> Result<Vec<String>> {
    array
        .elems
        .iter()
        .map(|elem| match elem {
            Expr::Lit(expr) => match &expr.lit {
                Lit::Str(s) => Ok(s.value()),
                _ => Err(syn::Error::new(elem.span(), "expected string literal")),
            },
            _ => Err(syn::Error::new(elem.span(), "expected string literal")),
        })
        .collect()
}
