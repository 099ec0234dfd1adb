//! The typed abstract syntax tree produced by the parser and consumed by
//! the formatter.
//!
//! Two sum types anchor everything else: [`StmtKind`] (top-level
//! statements) and [`ExprKind`] (expressions). Both are wrapped in a node
//! struct (`Stmt`, `Expr`) that carries the leading comments attached to
//! it, since every node in the tree can have comments reattached by the
//! formatter. The escape hatch is [`Raw`]: any construct the parser can't
//! fully model lands there instead of being dropped or guessed at.

/// A comment captured verbatim, with enough information for the formatter
/// to reproduce its original form and placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Verbatim text exactly as it appeared in source, including its
    /// comment marker (`--`, `/* ... */`, MySQL `#`, Oracle `REM`, psql
    /// `\`) so the formatter reproduces it byte-for-byte.
    pub text: String,
    pub kind: CommentKind,
    /// True if this comment followed its node on the same source line
    /// (a trailing comment) rather than preceding it.
    pub trailing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    Line,
    Block,
}

/// Why a region of source landed in a [`Raw`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawReason {
    /// The parser recognizes the construct but deliberately declines to
    /// model it further (e.g. a vendor-specific pragma).
    Verbatim,
    /// Recovery mode skipped a region it could not parse at all.
    Unsupported,
}

/// Verbatim source text, preserved byte-for-byte. The formatter may only
/// adjust the indentation of the first line and the trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw {
    pub text: String,
    pub reason: RawReason,
}

/// A possibly-quoted identifier. `quote` records the opening quote
/// character (`"`, `` ` ``, or `[`) so the formatter preserves it exactly;
/// unquoted identifiers keep the casing they were written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub value: String,
    pub quote: Option<char>,
}

impl Ident {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            quote: None,
        }
    }

    pub fn quoted(value: impl Into<String>, quote: char) -> Self {
        Self {
            value: value.into(),
            quote: Some(quote),
        }
    }
}

/// A dotted name such as `schema.table` or `db.schema.table`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectName(pub Vec<Ident>);

impl ObjectName {
    pub fn single(ident: Ident) -> Self {
        Self(vec![ident])
    }
}

/// A statement node: leading comments plus the statement itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub leading_comments: Vec<Comment>,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self {
            leading_comments: Vec::new(),
            kind,
        }
    }

    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.leading_comments = comments;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    Select(Box<SelectStmt>),
    Insert(Box<Insert>),
    Update(Box<Update>),
    Delete(Box<Delete>),
    Merge(Box<Merge>),
    Cte(Box<CteStmt>),
    Union(Box<UnionStmt>),
    CreateTable(Box<CreateTable>),
    CreateIndex(Box<CreateIndex>),
    CreateView(Box<CreateView>),
    CreatePolicy(Box<CreatePolicy>),
    AlterTable(Box<AlterTable>),
    DropTable(Box<DropTable>),
    Grant(Box<GrantOrRevoke>),
    Revoke(Box<GrantOrRevoke>),
    Truncate(Box<Truncate>),
    Explain(Box<Explain>),
    Comment(Box<CommentOnStmt>),
    Raw(Raw),
}

/// An expression node: leading comments plus the expression itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub leading_comments: Vec<Comment>,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            leading_comments: Vec::new(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    /// Any of the quoted-string forms (`'...'`, `E'...'`, `$$...$$`, …);
    /// the tokenizer normalizes these into one literal kind, the original
    /// spelling is kept in `raw_text` so the formatter can reproduce it.
    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Exact source spelling, including any prefix (`E`, `N`, `X`, `B`,
    /// `U&`) and quote characters.
    pub raw_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    Custom(CustomOp),
}

/// An operator lexeme the parser recognizes syntactically (it appears in
/// the tokenizer's operator table) but gives no special precedence
/// handling beyond "binary, left associative" — e.g. PostgreSQL's JSON
/// (`->`, `->>`, `#>`) and containment (`@>`, `<@`) operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomOp {
    JsonArrow,
    JsonArrowText,
    JsonHashArrow,
    JsonHashArrowText,
    Contains,
    ContainedBy,
    HasKey,
    HasAnyKey,
    HasAllKeys,
    Overlap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: BinaryOp,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
    BitNot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub expr: Box<Expr>,
}

/// `ORDER BY` item: expression plus the `ASC`/`DESC`/`NULLS FIRST|LAST`
/// modifiers, which only ever appear in that clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedExpr {
    pub expr: Box<Expr>,
    pub asc: Option<bool>,
    pub nulls_first: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArg {
    pub name: Option<Ident>,
    pub expr: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullHandling {
    RespectNulls,
    IgnoreNulls,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowSpec {
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderedExpr>,
    pub frame: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowRef {
    Inline(Box<WindowSpec>),
    Named(Ident),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionCall {
    pub name: ObjectName,
    pub distinct: bool,
    pub args: Vec<FunctionArg>,
    /// `true` for the bare `*` argument form, e.g. `COUNT(*)`.
    pub star_arg: bool,
    pub order_by: Vec<OrderedExpr>,
    pub within_group: Vec<OrderedExpr>,
    pub filter: Option<Box<Expr>>,
    pub null_handling: Option<NullHandling>,
    pub over: Option<WindowRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseWhen {
    pub condition: Expr,
    pub result: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaseExpr {
    /// `Some` for the "simple" `CASE x WHEN ...` form.
    pub operand: Option<Box<Expr>>,
    pub whens: Vec<CaseWhen>,
    pub else_result: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    pub name: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastExpr {
    pub expr: Box<Expr>,
    pub data_type: DataType,
    /// `true` for PostgreSQL's `expr::type` shorthand, `false` for
    /// `CAST(expr AS type)`.
    pub shorthand: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractExpr {
    pub field: String,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalExpr {
    pub value: String,
    pub leading_field: Option<String>,
    pub trailing_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedStringExpr {
    pub data_type: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeKind {
    Like,
    ILike,
    SimilarTo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeExpr {
    pub kind: LikeKind,
    pub negated: bool,
    pub expr: Box<Expr>,
    pub pattern: Box<Expr>,
    pub escape: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InExpr {
    pub expr: Box<Expr>,
    pub negated: bool,
    pub list: InList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InList {
    Exprs(Vec<Expr>),
    Subquery(Box<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetweenExpr {
    pub expr: Box<Expr>,
    pub negated: bool,
    pub low: Box<Expr>,
    pub high: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsPredicate {
    Null,
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsExpr {
    pub expr: Box<Expr>,
    pub negated: bool,
    pub predicate: IsPredicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsDistinctFromExpr {
    pub left: Box<Expr>,
    pub negated: bool,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexMatchExpr {
    pub expr: Box<Expr>,
    pub negated: bool,
    pub case_insensitive: bool,
    pub pattern: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Any,
    Some,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantifiedComparisonExpr {
    pub left: Box<Expr>,
    pub op: BinaryOp,
    pub quantifier: Quantifier,
    pub query: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Literal(Literal),
    Null,
    Star,
    Identifier(ObjectName),
    FunctionCall(FunctionCall),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Paren(Box<Expr>),
    Tuple(Vec<Expr>),
    Case(CaseExpr),
    Cast(CastExpr),
    Extract(ExtractExpr),
    Interval(IntervalExpr),
    TypedString(TypedStringExpr),
    Exists(Box<Stmt>),
    Subquery(Box<Stmt>),
    In(InExpr),
    Between(BetweenExpr),
    Like(LikeExpr),
    Is(IsExpr),
    IsDistinctFrom(IsDistinctFromExpr),
    RegexMatch(RegexMatchExpr),
    QuantifiedComparison(QuantifiedComparisonExpr),
    ArrayConstructor(Vec<Expr>),
    OrderedExpr(OrderedExpr),
    Raw(Raw),
}

// ---------------------------------------------------------------------
// SELECT and its clauses
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistinctClause {
    pub on: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Natural,
    /// T-SQL/Oracle lateral cross/outer apply.
    CrossApply,
    OuterApply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinCondition {
    On(Expr),
    Using(Vec<Ident>),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFactor {
    pub kind: TableFactorKind,
    pub alias: Option<Ident>,
    pub column_aliases: Vec<Ident>,
    pub lateral: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableFactorKind {
    Table(ObjectName),
    Subquery(Box<Stmt>),
    /// `UNNEST(...)`, `generate_series(...)`, etc.
    FunctionCall(FunctionCall),
    Raw(Raw),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub factor: TableFactor,
    pub condition: JoinCondition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromItem {
    pub factor: TableFactor,
    pub joins: Vec<Join>,
    /// T-SQL/Oracle `PIVOT (...)`/`UNPIVOT (...)`, kept verbatim since its
    /// aggregate-list grammar is a long tail of vendor-specific shapes.
    pub pivot: Option<Raw>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupByKind {
    Simple,
    Rollup,
    Cube,
    GroupingSets,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupByClause {
    pub kind: GroupByKind,
    pub items: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedWindow {
    pub name: Ident,
    pub spec: WindowSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStrength {
    Update,
    Share,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockingClause {
    pub strength: LockStrength,
    pub of: Vec<ObjectName>,
    pub nowait: bool,
    pub skip_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchClause {
    pub count: Expr,
    pub with_ties: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectStmt {
    pub distinct: Option<DistinctClause>,
    pub top: Option<Expr>,
    pub columns: Vec<SelectItem>,
    pub from: Vec<FromItem>,
    pub where_clause: Option<Expr>,
    pub group_by: Option<GroupByClause>,
    pub having: Option<Expr>,
    pub windows: Vec<NamedWindow>,
    pub qualify: Option<Expr>,
    pub order_by: Vec<OrderedExpr>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub fetch: Option<FetchClause>,
    pub locking: Vec<LockingClause>,
    /// T-SQL `FOR JSON`/`FOR XML`, kept verbatim since its grammar is a
    /// long tail of vendor-specific sub-options.
    pub for_clause: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Union,
    Intersect,
    Except,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetQuantifier {
    All,
    Distinct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOperation {
    pub op: SetOp,
    pub quantifier: SetQuantifier,
    pub right: Stmt,
}

/// A chain of set operators: `left (UNION|INTERSECT|EXCEPT [ALL|DISTINCT] right)*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionStmt {
    pub left: Stmt,
    pub rest: Vec<SetOperation>,
    pub order_by: Vec<OrderedExpr>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CteEntry {
    pub name: Ident,
    pub column_aliases: Vec<Ident>,
    pub materialized: Option<bool>,
    pub query: Stmt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CteStmt {
    pub recursive: bool,
    pub ctes: Vec<CteEntry>,
    pub body: Stmt,
}

// ---------------------------------------------------------------------
// DML
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertSource {
    Values(Vec<Vec<Expr>>),
    Query(Box<Stmt>),
    DefaultValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOrAction {
    Replace,
    Ignore,
    Abort,
    Fail,
    Rollback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnConflict {
    pub target_columns: Vec<Ident>,
    pub target_constraint: Option<Ident>,
    pub do_nothing: bool,
    pub do_update: Vec<Assignment>,
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub target: ObjectName,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Insert {
    pub table: ObjectName,
    pub alias: Option<Ident>,
    pub or_action: Option<InsertOrAction>,
    pub columns: Vec<Ident>,
    pub source: Option<InsertSource>,
    pub on_conflict: Option<OnConflict>,
    pub on_duplicate_key_update: Vec<Assignment>,
    pub returning: Vec<SelectItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub table: ObjectName,
    pub alias: Option<Ident>,
    pub assignments: Vec<Assignment>,
    pub from: Vec<FromItem>,
    pub where_clause: Option<Expr>,
    pub returning: Vec<SelectItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delete {
    pub table: ObjectName,
    pub alias: Option<Ident>,
    pub using: Vec<FromItem>,
    pub where_clause: Option<Expr>,
    pub returning: Vec<SelectItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAction {
    Matched,
    NotMatched,
    NotMatchedBySource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOperation {
    Update(Vec<Assignment>),
    Insert {
        columns: Vec<Ident>,
        values: Vec<Expr>,
    },
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeClause {
    pub action: MergeAction,
    pub condition: Option<Expr>,
    pub operation: MergeOperation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merge {
    pub target: ObjectName,
    pub target_alias: Option<Ident>,
    pub source: TableFactor,
    pub on: Expr,
    pub clauses: Vec<MergeClause>,
}

// ---------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: Ident,
    pub data_type: DataType,
    pub constraints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableElement {
    Column(ColumnDef),
    /// Table-level constraints (`PRIMARY KEY (...)`, `FOREIGN KEY ...`,
    /// `CHECK (...)`) are kept verbatim: their grammar is a long tail of
    /// vendor-specific syntax that adds little by modeling further.
    Constraint(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateTable {
    pub if_not_exists: bool,
    pub name: ObjectName,
    pub elements: Vec<TableElement>,
    pub as_query: Option<Box<Stmt>>,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    pub expr: Expr,
    pub asc: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndex {
    pub unique: bool,
    pub concurrently: bool,
    pub if_not_exists: bool,
    pub name: Option<Ident>,
    pub table: ObjectName,
    pub using: Option<Ident>,
    pub columns: Vec<IndexColumn>,
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateView {
    pub or_replace: bool,
    pub materialized: bool,
    pub name: ObjectName,
    pub column_aliases: Vec<Ident>,
    pub query: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePolicy {
    pub name: Ident,
    pub table: ObjectName,
    /// `FOR {ALL|SELECT|INSERT|UPDATE|DELETE}`, `TO ...`, `USING (...)`,
    /// `WITH CHECK (...)` kept as ordered raw clauses; RLS policy syntax
    /// varies enough across engines that a flat list is the honest model.
    pub clauses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterAction {
    AddColumn(ColumnDef),
    DropColumn { name: Ident, if_exists: bool },
    RenameColumn { from: Ident, to: Ident },
    RenameTable(ObjectName),
    AlterColumnType { name: Ident, data_type: DataType },
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterTable {
    pub if_exists: bool,
    pub name: ObjectName,
    pub actions: Vec<AlterAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTable {
    pub if_exists: bool,
    pub names: Vec<ObjectName>,
    pub cascade: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncate {
    pub names: Vec<ObjectName>,
    pub cascade: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantRevokeObject {
    Table,
    Schema,
    Database,
    Sequence,
    Function,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantOrRevoke {
    pub privileges: Vec<String>,
    pub object_kind: Option<GrantRevokeObject>,
    pub objects: Vec<ObjectName>,
    pub grantees: Vec<Ident>,
    pub with_grant_option: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explain {
    pub analyze: bool,
    pub verbose: bool,
    pub options: Vec<String>,
    pub statement: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentObject {
    Table(ObjectName),
    Column(ObjectName),
    Other { kind: String, name: ObjectName },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentOnStmt {
    pub object: CommentObject,
    pub text: Option<String>,
}
