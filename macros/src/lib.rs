use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{
    parse_macro_input, Attribute, DeriveInput, FnArg, ImplItem, ImplItemFn, ItemImpl, LitInt,
    LitStr, Meta, Path, Type,
};

const ROUTE_METHODS: [&str; 5] = ["get", "post", "put", "delete", "patch"];

/// Generates an Axum router, a route table and an OpenAPI document from the
/// route-annotated methods of an impl block.
///
/// Usage:
/// ```rust,ignore
/// struct UserController;
///
/// #[controller(state = AppState, tag = "users")]
/// impl UserController {
///     #[get("/users/{id}")]
///     #[utoipa_response(status = 200, body = User, description = "User found")]
///     async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> Json<User> {
///         // ...
///     }
///
///     #[post("/users")]
///     #[request_body(CreateUser)]
///     async fn create(ValidatedJson(body): ValidatedJson<CreateUser>) -> StatusCode {
///         // ...
///     }
/// }
/// ```
///
/// `state` defaults to `()`, `tag` to the struct name without its
/// `Controller` suffix. The expansion implements
/// `harbor_core::controller::Controller` and declares `UserControllerApi`,
/// a `utoipa::OpenApi` document listing every route.
#[proc_macro_attribute]
pub fn controller(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut state: Option<Type> = None;
    let mut tag: Option<LitStr> = None;
    let args_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("state") {
            state = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("tag") {
            tag = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("expected `state = Type` or `tag = \"name\"`"))
        }
    });
    parse_macro_input!(args with args_parser);

    let mut impl_block = parse_macro_input!(input as ItemImpl);
    let self_ty = impl_block.self_ty.clone();
    let struct_name = match &*self_ty {
        Type::Path(type_path) => match type_path.path.segments.last() {
            Some(segment) => segment.ident.clone(),
            None => {
                return syn::Error::new(self_ty.span(), "Expected a struct type")
                    .to_compile_error()
                    .into();
            }
        },
        _ => {
            return syn::Error::new(impl_block.span(), "Expected a struct type")
                .to_compile_error()
                .into();
        }
    };

    let state = state.unwrap_or_else(|| syn::parse_quote!(()));
    let tag = tag.unwrap_or_else(|| {
        let name = struct_name.to_string();
        let name = name.strip_suffix("Controller").unwrap_or(&name);
        LitStr::new(&name.to_lowercase(), struct_name.span())
    });

    let mut route_registrations = Vec::new();
    let mut route_infos = Vec::new();
    let mut openapi_path_functions = Vec::new();
    let mut openapi_path_names = Vec::new();
    let mut schema_types = Vec::new();

    for item in &mut impl_block.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };

        let route = match extract_route_attr(&method.attrs) {
            Ok(Some(route)) => route,
            Ok(None) => continue,
            Err(err) => return err.to_compile_error().into(),
        };

        if let Some(receiver) = method
            .sig
            .inputs
            .iter()
            .find(|input| matches!(input, FnArg::Receiver(_)))
        {
            return syn::Error::new(
                receiver.span(),
                "route handlers must be associated functions without `self`",
            )
            .to_compile_error()
            .into();
        }

        let fn_name = &method.sig.ident;
        let axum_method = format_ident!("{}", route.method);
        let path_lit = LitStr::new(&route.path, method.span());
        let method_upper = route.method.to_uppercase();
        let handler_name = format!("{}::{}", struct_name, fn_name);

        route_registrations.push(quote! {
            .route(#path_lit, ::axum::routing::#axum_method(<#self_ty>::#fn_name))
        });
        route_infos.push(quote! {
            ::harbor_core::controller::RouteInfo {
                method: #method_upper,
                path: #path_lit,
                handler: #handler_name,
            }
        });

        let responses = match extract_utoipa_response_attrs(&method.attrs) {
            Ok(responses) => responses,
            Err(err) => return err.to_compile_error().into(),
        };
        let request_body = match extract_request_body_attr(&method.attrs) {
            Ok(body) => body,
            Err(err) => return err.to_compile_error().into(),
        };
        for response in &responses {
            schema_types.extend(response.schema_types());
        }
        if let Some(body) = &request_body {
            schema_types.push(body.clone());
        }

        let wrapper = documentation_wrapper(method, &route, &tag, &responses, request_body.as_ref());
        openapi_path_names.push(format_ident!("__harbor_doc_{}", fn_name));
        openapi_path_functions.push(wrapper);

        method.attrs.retain(|attr| !is_helper_attr(attr));
    }

    let unique_schemas = dedup_types(schema_types);
    let api_struct_name = format_ident!("{}Api", struct_name);
    let openapi_attr = if unique_schemas.is_empty() {
        quote! {
            #[derive(::utoipa::OpenApi)]
            #[openapi(paths(#(#openapi_path_names),*))]
        }
    } else {
        quote! {
            #[derive(::utoipa::OpenApi)]
            #[openapi(
                paths(#(#openapi_path_names),*),
                components(schemas(#(#unique_schemas),*))
            )]
        }
    };

    let expanded = quote! {
        #impl_block

        impl ::harbor_core::controller::Controller for #self_ty {
            type State = #state;

            fn router() -> ::axum::Router<Self::State> {
                ::axum::Router::new()
                    #(#route_registrations)*
            }

            fn routes() -> &'static [::harbor_core::controller::RouteInfo] {
                &[#(#route_infos),*]
            }
        }

        #(#openapi_path_functions)*

        #openapi_attr
        pub struct #api_struct_name;
    };

    TokenStream::from(expanded)
}

struct RouteAttr {
    method: String,
    path: String,
}

fn attr_name(attr: &Attribute) -> Option<String> {
    attr.path()
        .segments
        .last()
        .map(|segment| segment.ident.to_string())
}

fn is_helper_attr(attr: &Attribute) -> bool {
    match attr_name(attr) {
        Some(name) => {
            ROUTE_METHODS.contains(&name.as_str())
                || name == "utoipa_response"
                || name == "request_body"
        }
        None => false,
    }
}

/// Finds `#[get("/path")]`, `#[harbor_macros::post("/path")]` and friends.
fn extract_route_attr(attrs: &[Attribute]) -> syn::Result<Option<RouteAttr>> {
    let mut found: Option<RouteAttr> = None;

    for attr in attrs {
        let Some(name) = attr_name(attr) else {
            continue;
        };
        if !ROUTE_METHODS.contains(&name.as_str()) {
            continue;
        }

        let Meta::List(meta) = &attr.meta else {
            return Err(syn::Error::new(attr.span(), "expected a path, e.g. #[get(\"/items\")]"));
        };
        let path: LitStr = syn::parse2(meta.tokens.clone())?;
        if !path.value().starts_with('/') {
            return Err(syn::Error::new(path.span(), "route paths must start with `/`"));
        }
        if found.is_some() {
            return Err(syn::Error::new(attr.span(), "a handler can only have one route attribute"));
        }

        found = Some(RouteAttr {
            method: name,
            path: path.value(),
        });
    }

    Ok(found)
}

enum ResponseDoc {
    /// A type implementing `utoipa::IntoResponses`.
    Responses(Type),
    Body {
        status: u16,
        body: Type,
        description: String,
    },
}

impl ResponseDoc {
    fn tokens(&self) -> proc_macro2::TokenStream {
        match self {
            ResponseDoc::Responses(ty) => quote! { #ty },
            ResponseDoc::Body {
                status,
                body,
                description,
            } => {
                let status = proc_macro2::Literal::u16_unsuffixed(*status);
                quote! {
                    (status = #status, description = #description, body = #body)
                }
            }
        }
    }

    fn schema_types(&self) -> Vec<Type> {
        let mut types = Vec::new();
        match self {
            ResponseDoc::Responses(ty) => extract_types_from_generic(ty, &mut types),
            ResponseDoc::Body { body, .. } => types.push(body.clone()),
        }
        types
    }
}

/// Reads every `#[utoipa_response(...)]` on a handler:
/// - `#[utoipa_response(Type)]` - status 200 with `Type` as body
/// - `#[utoipa_response(status = 201, body = Type, description = "Created")]`
/// - `#[utoipa_response(response = Type)]` - `Type` implements `IntoResponses`
fn extract_utoipa_response_attrs(attrs: &[Attribute]) -> syn::Result<Vec<ResponseDoc>> {
    let mut responses = Vec::new();

    for attr in attrs {
        if attr_name(attr).as_deref() != Some("utoipa_response") {
            continue;
        }
        let Meta::List(meta) = &attr.meta else {
            return Err(syn::Error::new(attr.span(), "expected #[utoipa_response(...)]"));
        };
        let tokens = meta.tokens.clone();

        if let Ok(parsed) = syn::parse2::<UtoipaResponseArgs>(tokens.clone()) {
            if let Some(response) = parsed.response {
                responses.push(ResponseDoc::Responses(response));
                continue;
            }
            if let Some(body) = parsed.body {
                responses.push(ResponseDoc::Body {
                    status: parsed.status.unwrap_or(200),
                    body,
                    description: parsed.description.unwrap_or_else(|| "Success".to_owned()),
                });
                continue;
            }
        }

        let body: Type = syn::parse2(tokens)?;
        responses.push(ResponseDoc::Body {
            status: 200,
            body,
            description: "Success".to_owned(),
        });
    }

    Ok(responses)
}

fn extract_request_body_attr(attrs: &[Attribute]) -> syn::Result<Option<Type>> {
    for attr in attrs {
        if attr_name(attr).as_deref() == Some("request_body") {
            return attr.parse_args::<Type>().map(Some);
        }
    }
    Ok(None)
}

/// Module-level copy of a handler signature carrying `#[utoipa::path]`.
///
/// utoipa cannot document methods inside an impl block, so each route gets a
/// twin that exists only for the generated `OpenApi` document.
fn documentation_wrapper(
    method: &ImplItemFn,
    route: &RouteAttr,
    tag: &LitStr,
    responses: &[ResponseDoc],
    request_body: Option<&Type>,
) -> proc_macro2::TokenStream {
    let fn_name = &method.sig.ident;
    let wrapper_name = format_ident!("__harbor_doc_{}", fn_name);
    let utoipa_method = format_ident!("{}", route.method);
    let path_lit = LitStr::new(&route.path, method.span());
    let operation_id = LitStr::new(&fn_name.to_string(), fn_name.span());

    let fn_async = method.sig.asyncness;
    let fn_inputs = &method.sig.inputs;
    let fn_output = &method.sig.output;
    let fn_generics = &method.sig.generics;
    let fn_where_clause = &method.sig.generics.where_clause;

    let mut path_args = vec![
        quote! { #utoipa_method },
        quote! { path = #path_lit },
        quote! { operation_id = #operation_id },
        quote! { tag = #tag },
    ];
    if let Some(body) = request_body {
        path_args.push(quote! { request_body = #body });
    }
    if !responses.is_empty() {
        let response_tokens = responses.iter().map(ResponseDoc::tokens);
        path_args.push(quote! { responses(#(#response_tokens),*) });
    }

    quote! {
        #[allow(dead_code, unused_variables, non_snake_case, clippy::unused_async)]
        #[::utoipa::path(#(#path_args),*)]
        #fn_async fn #wrapper_name #fn_generics(#fn_inputs) #fn_output #fn_where_clause {
            unimplemented!("documentation-only twin of a controller route")
        }
    }
}

fn dedup_types(types: Vec<Type>) -> Vec<Type> {
    let mut seen = std::collections::HashSet::new();
    types
        .into_iter()
        .filter(|ty| seen.insert(quote!(#ty).to_string()))
        .collect()
}

/// Collects the generic arguments of a type, e.g. `T` and `E` from
/// `Responses<T, E>`, so they can be registered as schemas.
fn extract_types_from_generic(ty: &Type, schema_types: &mut Vec<Type>) {
    let Type::Path(type_path) = ty else {
        return;
    };
    let Some(segment) = type_path.path.segments.last() else {
        return;
    };
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return;
    };

    for arg in &args.args {
        if let syn::GenericArgument::Type(inner) = arg {
            extract_types_from_generic(inner, schema_types);
            schema_types.push(inner.clone());
        }
    }
}

#[derive(Debug)]
struct UtoipaResponseArgs {
    status: Option<u16>,
    body: Option<Type>,
    response: Option<Type>,
    description: Option<String>,
}

impl syn::parse::Parse for UtoipaResponseArgs {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let mut args = UtoipaResponseArgs {
            status: None,
            body: None,
            response: None,
            description: None,
        };

        while !input.is_empty() {
            let key: syn::Ident = input.parse()?;
            let _eq: syn::Token![=] = input.parse()?;

            match key.to_string().as_str() {
                "status" => args.status = Some(input.parse::<LitInt>()?.base10_parse()?),
                "body" => args.body = Some(input.parse()?),
                "response" => args.response = Some(input.parse()?),
                "description" => args.description = Some(input.parse::<LitStr>()?.value()),
                other => {
                    return Err(syn::Error::new(key.span(), format!("Unknown argument: {}", other)));
                }
            }

            if !input.is_empty() {
                let _comma: syn::Token![,] = input.parse()?;
            }
        }

        if args.body.is_some() && args.response.is_some() {
            return Err(input.error(
                "Cannot specify both 'body' and 'response'. Use 'body' for simple types or 'response' for IntoResponses types.",
            ));
        }

        Ok(args)
    }
}

/// Declares a request body shape.
///
/// Derives `serde::Deserialize` and `utoipa::ToSchema`, refuses undeclared
/// properties (`#[serde(deny_unknown_fields)]`) and implements
/// `harbor_core::validation::Dto`. Constraints are attached with
/// `#[dto(validate = Self::check)]`, where the function takes `&Self` and
/// returns `Result<(), ValidationErrors>`.
///
/// Do not derive `Deserialize` yourself on a `#[dto]` type.
#[proc_macro_attribute]
pub fn dto(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut validate: Option<Path> = None;
    let args_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("validate") {
            validate = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("expected `validate = path::to::function`"))
        }
    });
    parse_macro_input!(args with args_parser);

    let item = parse_macro_input!(input as DeriveInput);
    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();

    let validate_fn = validate.map(|path| {
        quote! {
            fn validate(&self) -> ::core::result::Result<(), ::harbor_core::validation::ValidationErrors> {
                #path(self)
            }
        }
    });

    let expanded = quote! {
        #[derive(::serde::Deserialize, ::utoipa::ToSchema)]
        #[serde(deny_unknown_fields)]
        #item

        impl #impl_generics ::harbor_core::validation::Dto for #name #ty_generics #where_clause {
            #validate_fn
        }
    };

    TokenStream::from(expanded)
}

/// Macro for GET route
#[proc_macro_attribute]
pub fn get(args: TokenStream, input: TokenStream) -> TokenStream {
    outside_controller("get", args, input)
}

/// Macro for POST route
#[proc_macro_attribute]
pub fn post(args: TokenStream, input: TokenStream) -> TokenStream {
    outside_controller("post", args, input)
}

/// Macro for PUT route
#[proc_macro_attribute]
pub fn put(args: TokenStream, input: TokenStream) -> TokenStream {
    outside_controller("put", args, input)
}

/// Macro for DELETE route
#[proc_macro_attribute]
pub fn delete(args: TokenStream, input: TokenStream) -> TokenStream {
    outside_controller("delete", args, input)
}

/// Macro for PATCH route
#[proc_macro_attribute]
pub fn patch(args: TokenStream, input: TokenStream) -> TokenStream {
    outside_controller("patch", args, input)
}

/// Documents a response of a controller route. Multiple attributes may be
/// stacked, see [`controller`].
#[proc_macro_attribute]
pub fn utoipa_response(args: TokenStream, input: TokenStream) -> TokenStream {
    outside_controller("utoipa_response", args, input)
}

/// Documents the request body of a controller route.
#[proc_macro_attribute]
pub fn request_body(args: TokenStream, input: TokenStream) -> TokenStream {
    outside_controller("request_body", args, input)
}

/// `#[controller]` consumes its helper attributes before they expand, so
/// reaching one of these means it was placed outside a controller impl.
fn outside_controller(name: &str, _args: TokenStream, input: TokenStream) -> TokenStream {
    let input = proc_macro2::TokenStream::from(input);
    let message = format!("#[{}] is only valid on methods of a #[controller] impl block", name);
    let error = syn::Error::new(input.span(), message).to_compile_error();

    TokenStream::from(quote! {
        #error
        #input
    })
}
