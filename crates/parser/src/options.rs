use sqlfmt_core::Dialect;

/// The verbatim token span recovery mode skipped, handed to an optional
/// `onRecovery` callback before it is wrapped into a `raw` AST
/// node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredSpan {
    pub text: String,
    pub line: u32,
    pub column: u32,
}

/// Options accepted by [`crate::tokenizer::tokenize`].
#[derive(Debug, Clone)]
pub struct TokenizeOptions {
    pub dialect: Dialect,
    /// Hard ceiling on emitted tokens; protects against pathological
    /// inputs. Defaults to 1,000,000.
    pub max_token_count: usize,
    /// Recognize psql `\command` lines as comments during tokenization,
    /// used by recovery mode to step over meta-commands.
    pub allow_meta_commands: bool,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            max_token_count: 1_000_000,
            allow_meta_commands: false,
        }
    }
}

/// Options accepted by [`crate::parse`].
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub dialect: Dialect,
    /// `false` (default): surface the first syntax error as a
    /// `ParseError`. `true`: swallow syntax errors into `raw` AST nodes
    /// and keep going.
    pub recover: bool,
    /// Hard ceiling on recursive-descent depth.
    pub max_depth: usize,
    pub max_token_count: usize,
    pub allow_meta_commands: bool,
    /// Called with each verbatim span recovery mode skips over, before it
    /// is wrapped into a `raw` AST node. A plain function pointer (not a
    /// boxed closure) so `ParseOptions` stays `Clone`/`Debug` without a
    /// hand-written impl.
    pub on_recovery: Option<fn(RecoveredSpan)>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            recover: false,
            max_depth: 128,
            max_token_count: 1_000_000,
            allow_meta_commands: false,
            on_recovery: None,
        }
    }
}

impl ParseOptions {
    pub fn tokenize_options(&self) -> TokenizeOptions {
        TokenizeOptions {
            dialect: self.dialect.clone(),
            max_token_count: self.max_token_count,
            allow_meta_commands: self.allow_meta_commands,
        }
    }
}
