use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{self, parse_macro_input, Ident, ImplItemFn, Stmt};

/// This macro is added before a method of `Simulator` struct in the impl block.
/// Use this macro to first check if current game phase is exactly the phase in
/// the attribute.
///
/// For example, `#[allowed_phase(PlaceBets)]` will make a method first check
/// if current game phase is `PlaceBets`. If not, the method will return
/// `Error::WrongPhase` naming the method, the expected phase and the actual one.
///
/// The annotated method must return `crate::Result<_>`, and `GamePhase` must be
/// in scope where the impl block lives.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream1, item: TokenStream1) -> TokenStream1 {
    let phase = parse_macro_input!(attr as Ident);
    let mut ast = parse_macro_input!(item as ImplItemFn);
    let function_name = ast.sig.ident.to_string();

    let early_return = phase_guard(&phase, &function_name);
    let early_return: Stmt = match syn::parse2(early_return) {
        Ok(stmt) => stmt,
        Err(err) => return err.to_compile_error().into(),
    };
    ast.block.stmts.insert(0, early_return);
    ast.into_token_stream().into()
}

fn phase_guard(phase: &Ident, function_name: &str) -> TokenStream2 {
    quote! {
        if self.current_game_phase != GamePhase::#phase {
            return Err(crate::Error::WrongPhase {
                method: #function_name,
                expected: GamePhase::#phase,
                actual: self.current_game_phase,
            });
        }
    }
}
