//! Registry of diagnostic codes emitted by `typecheck-vdm`.
//!
//! Each [`Code`] documents the expected shape of diagnostics the checker emits:
//! the fixed message, where the primary span should point, and any additional
//! labels or notes that accompany the diagnostic. Errors are numbered 3xxx and
//! warnings 5xxx.

use diagnostics::sort_diagnostics;
use diagnostics::sort_labels;
use diagnostics::Diagnostic;
use diagnostics::Severity;
use diagnostics::Span;

/// Metadata describing a diagnostic code.
#[derive(Clone, Copy, Debug)]
pub struct Code {
  pub id: u32,
  pub severity: Severity,
  /// The message, or its template when the message carries a number.
  pub description: &'static str,
  /// Guidance for where the primary span should be anchored.
  pub primary_span: &'static str,
  pub labels: &'static [&'static str],
  pub notes: &'static [&'static str],
}

impl Code {
  pub const fn error(
    id: u32,
    description: &'static str,
    primary_span: &'static str,
    labels: &'static [&'static str],
    notes: &'static [&'static str],
  ) -> Self {
    Code {
      id,
      severity: Severity::Error,
      description,
      primary_span,
      labels,
      notes,
    }
  }

  pub const fn warning(
    id: u32,
    description: &'static str,
    primary_span: &'static str,
    labels: &'static [&'static str],
    notes: &'static [&'static str],
  ) -> Self {
    Code {
      id,
      severity: Severity::Warning,
      description,
      primary_span,
      labels,
      notes,
    }
  }

  /// Construct a diagnostic with the code's fixed message.
  pub fn at(&self, primary: Span) -> Diagnostic {
    self.with_message(self.description, primary)
  }

  /// Construct a diagnostic with a message specific to this occurrence.
  pub fn with_message(&self, message: impl Into<String>, primary: Span) -> Diagnostic {
    let mut diagnostic = Diagnostic::new(self.severity, self.id, message, primary);
    for note in self.notes {
      diagnostic.push_note(*note);
    }
    diagnostic
  }

  /// Construct a diagnostic whose message template takes a one-based
  /// position, such as the argument number.
  pub fn numbered(&self, n: usize, primary: Span) -> Diagnostic {
    self.with_message(self.description.replace("{}", &n.to_string()), primary)
  }
}

/// Sort labels inside each diagnostic and then the diagnostics themselves to
/// keep outputs deterministic regardless of traversal order.
pub fn normalize_diagnostics(diagnostics: &mut Vec<Diagnostic>) {
  for diagnostic in diagnostics.iter_mut() {
    sort_labels(&mut diagnostic.labels);
    diagnostic.notes.sort();
  }
  sort_diagnostics(diagnostics);
}

// Types and type names.

/// 3001: A type name does not resolve to any type in scope.
///
/// - Primary span: the type expression naming the missing type.
/// - Details: `Name`.
pub const UNDEFINED_TYPE: Code = Code::error(
  3001,
  "Undefined type",
  "the named type expression",
  &["primary: unresolved type name"],
  &[],
);

/// 3002: `@T` used outside a definition that declares it.
pub const UNDEFINED_TYPE_PARAMETER: Code = Code::error(
  3002,
  "Undefined type parameter",
  "the type parameter expression",
  &["primary: type parameter"],
  &[],
);

/// 3003: A public definition exposes a type that is less visible than itself.
///
/// - Primary span: the definition.
/// - Details: `Type`.
pub const TYPE_LESS_VISIBLE: Code = Code::error(
  3003,
  "Type is less visible than definition",
  "the definition whose signature exposes the type",
  &["primary: definition"],
  &[],
);

/// 3004: A name used as a type refers to something else.
pub const NOT_A_TYPE: Code = Code::error(
  3004,
  "Name is not a type",
  "the named type expression",
  &["primary: type name"],
  &[],
);

// Names and scopes.

/// 3010: A name does not resolve in the current scope.
///
/// - Primary span: the variable or call naming it.
/// - Details: `Name`.
pub const UNKNOWN_NAME: Code = Code::error(
  3010,
  "Unknown name",
  "the unresolved name",
  &["primary: name"],
  &[],
);

/// 3011: An unqualified reference matches several overloads.
///
/// - Primary span: the reference.
/// - Labels: one secondary label per candidate definition.
/// - Details: `Name`.
pub const AMBIGUOUS_NAME: Code = Code::error(
  3011,
  "Ambiguous function/operation name",
  "the ambiguous reference",
  &["primary: reference", "secondary: each candidate"],
  &[],
);

/// 3012: Two definitions of one name in the same scope.
///
/// - Primary span: the later definition.
/// - Labels: secondary at the earlier definition.
pub const DUPLICATE_DEFINITION: Code = Code::error(
  3012,
  "Duplicate definition",
  "the later definition",
  &["primary: later definition", "secondary: earlier definition"],
  &[],
);

/// 3013: Two overloads whose parameter types cannot be told apart, or a
/// function and an operation sharing a name.
///
/// - Primary span: the later definition.
/// - Labels: secondary at the earlier definition.
pub const DUPLICATE_OVERLOAD: Code = Code::error(
  3013,
  "Duplicate overloaded definition",
  "the later definition",
  &["primary: later definition", "secondary: earlier definition"],
  &[],
);

/// 3014: A private or protected member used where it cannot be seen.
pub const NOT_VISIBLE: Code = Code::error(
  3014,
  "Name is not visible",
  "the reference",
  &["primary: reference", "secondary: definition"],
  &[],
);

/// 3015: An instance member used from a static context.
pub const STATIC_ACCESS: Code = Code::error(
  3015,
  "Cannot access instance member from static context",
  "the reference",
  &["primary: reference"],
  &[],
);

/// 3016: `self` outside an instance context.
pub const SELF_NOT_ALLOWED: Code = Code::error(
  3016,
  "Cannot use self in this context",
  "the self expression",
  &["primary: self"],
  &[],
);

/// 3017: A class name that does not resolve.
///
/// - Details: `Name`.
pub const UNKNOWN_CLASS: Code = Code::error(
  3017,
  "Unknown class",
  "the class reference",
  &["primary: class name"],
  &[],
);

/// 3018: An import from a module that does not exist.
pub const UNKNOWN_MODULE: Code = Code::error(
  3018,
  "Unknown module",
  "the import clause",
  &["primary: import"],
  &[],
);

/// 3019: An imported name the exporting module does not export.
pub const NOT_EXPORTED: Code = Code::error(
  3019,
  "Imported name is not exported",
  "the import item",
  &["primary: import item"],
  &[],
);

/// 3020: An export names a definition the module does not have.
pub const EXPORT_UNDEFINED: Code = Code::error(
  3020,
  "Exported name is not defined",
  "the export item",
  &["primary: export item"],
  &[],
);

/// 3021: A class in VDM-SL or a module in VDM++.
pub const WRONG_DIALECT: Code = Code::error(
  3021,
  "Construct not allowed in this dialect",
  "the class or module",
  &["primary: item"],
  &[],
);

/// 3022: `x~` outside a postcondition.
pub const OLD_NAME_NOT_ALLOWED: Code = Code::error(
  3022,
  "Old name only allowed in post condition",
  "the old name",
  &["primary: name"],
  &[],
);

// Expressions.

/// 3030: A guard, condition or invariant that is not boolean.
///
/// - Details: `Actual`.
pub const PREDICATE_NOT_BOOLEAN: Code = Code::error(
  3030,
  "Predicate is not boolean",
  "the predicate expression",
  &["primary: predicate"],
  &[],
);

/// 3031: A numeric operator with a non-numeric operand.
///
/// - Details: `Operator`, `Actual`.
pub const EXPECTED_NUMERIC: Code = Code::error(
  3031,
  "Expecting numeric operand",
  "the offending operand",
  &["primary: operand"],
  &[],
);

/// 3032: A logical operator with a non-boolean operand.
pub const EXPECTED_BOOLEAN: Code = Code::error(
  3032,
  "Expecting boolean operand",
  "the offending operand",
  &["primary: operand"],
  &[],
);

/// 3033: A set operator with a non-set operand.
pub const EXPECTED_SET: Code = Code::error(
  3033,
  "Expecting set operand",
  "the offending operand",
  &["primary: operand"],
  &[],
);

/// 3034: A sequence operator with a non-sequence operand.
pub const EXPECTED_SEQ: Code = Code::error(
  3034,
  "Expecting sequence operand",
  "the offending operand",
  &["primary: operand"],
  &[],
);

/// 3035: A map operator with a non-map operand.
pub const EXPECTED_MAP: Code = Code::error(
  3035,
  "Expecting map operand",
  "the offending operand",
  &["primary: operand"],
  &[],
);

/// 3036: Operand types that can never hold the same value.
///
/// - Details: `Left`, `Right`.
pub const INCOMPATIBLE_OPERANDS: Code = Code::error(
  3036,
  "Incompatible operand types",
  "the binary expression",
  &["primary: expression"],
  &[],
);

/// 3037: `inter` of sets whose element types have nothing in common.
pub const EMPTY_INTERSECTION: Code = Code::error(
  3037,
  "Intersection of types is empty",
  "the intersection expression",
  &["primary: expression"],
  &[],
);

/// 3038: Application of something that is not a function, operation, sequence
/// or map.
///
/// - Details: `Type`.
pub const NOT_APPLICABLE: Code = Code::error(
  3038,
  "Expression cannot be applied",
  "the applied expression",
  &["primary: root of the application"],
  &[],
);

/// 3039: More arguments than parameters.
///
/// - Details: `Args`, `Params`.
pub const TOO_MANY_ARGUMENTS: Code = Code::error(
  3039,
  "Too many arguments",
  "the application",
  &["primary: application"],
  &[],
);

/// 3040: Fewer arguments than parameters.
///
/// - Details: `Args`, `Params`.
pub const TOO_FEW_ARGUMENTS: Code = Code::error(
  3040,
  "Too few arguments",
  "the application",
  &["primary: application"],
  &[],
);

/// 3041: `Inappropriate type for argument N`.
///
/// - Primary span: the argument.
/// - Details: `Expected`, `Actual`.
pub const ARGUMENT_TYPE: Code = Code::error(
  3041,
  "Inappropriate type for argument {}",
  "the offending argument",
  &["primary: argument"],
  &[],
);

/// 3042: A polymorphic function used before its type parameters are bound.
pub const UNINSTANTIATED: Code = Code::error(
  3042,
  "Polymorphic function is not instantiated",
  "the uninstantiated function",
  &["primary: function reference"],
  &[],
);

/// 3043: An operation called from a function.
pub const OPERATION_IN_FUNCTION: Code = Code::error(
  3043,
  "Cannot call operation in a functional context",
  "the call",
  &["primary: call"],
  &[],
);

/// 3044: A pure operation calling an impure one.
pub const IMPURE_CALL: Code = Code::error(
  3044,
  "Pure operation cannot call impure operation",
  "the call",
  &["primary: call"],
  &[],
);

/// 3045: A sequence index or map key of the wrong type.
///
/// - Details: `Expected`, `Actual`.
pub const INDEX_TYPE: Code = Code::error(
  3045,
  "Index has wrong type",
  "the index argument",
  &["primary: index"],
  &[],
);

/// 3046: A record or object has no such field.
///
/// - Details: `Field`, `Type`.
pub const UNKNOWN_FIELD: Code = Code::error(
  3046,
  "Unknown field",
  "the field expression",
  &["primary: field selection"],
  &[],
);

/// 3047: Field selection on something that is neither a record nor an object.
pub const NOT_A_RECORD_OR_OBJECT: Code = Code::error(
  3047,
  "Field selection on non-record or object",
  "the selected expression",
  &["primary: object"],
  &[],
);

/// 3048: `t.#n` outside the tuple's size.
pub const TUPLE_INDEX: Code = Code::error(
  3048,
  "Tuple field index out of range",
  "the tuple selection",
  &["primary: selection"],
  &[],
);

/// 3049: `t.#n` on a non-tuple.
pub const NOT_A_TUPLE: Code = Code::error(
  3049,
  "Tuple selector applied to non-tuple",
  "the tuple selection",
  &["primary: selection"],
  &[],
);

/// 3050: `mk_R(...)` with the wrong number of fields.
pub const RECORD_FIELD_COUNT: Code = Code::error(
  3050,
  "Record constructor has wrong number of fields",
  "the record constructor",
  &["primary: constructor"],
  &[],
);

/// 3051: `Constructor field N is of wrong type`.
///
/// - Primary span: the offending argument.
/// - Details: `Expected`, `Actual`.
pub const RECORD_FIELD_TYPE: Code = Code::error(
  3051,
  "Constructor field {} is of wrong type",
  "the offending argument",
  &["primary: argument"],
  &[],
);

/// 3052: `mk_R` or a record pattern naming something that is not a record.
pub const NOT_A_RECORD_TYPE: Code = Code::error(
  3052,
  "Not a record type",
  "the constructor or pattern",
  &["primary: record name"],
  &[],
);

/// 3053: `mu` applied to a non-record.
pub const MU_NOT_RECORD: Code = Code::error(
  3053,
  "mu expression is not a record",
  "the record operand",
  &["primary: operand"],
  &[],
);

/// 3054: A field update in `mu` with the wrong type.
///
/// - Details: `Field`, `Expected`, `Actual`.
pub const MU_FIELD_TYPE: Code = Code::error(
  3054,
  "Modified field is of wrong type",
  "the modifier value",
  &["primary: value"],
  &[],
);

/// 3055: A pattern that can never match the type it is bound to.
///
/// - Details: `Type`.
pub const PATTERN_TYPE: Code = Code::error(
  3055,
  "Pattern cannot match type",
  "the pattern",
  &["primary: pattern"],
  &[],
);

/// 3056: A set bind over something that is not a set.
pub const BIND_NOT_SET: Code = Code::error(
  3056,
  "Bind expression is not a set",
  "the bind expression",
  &["primary: bind source"],
  &[],
);

/// 3057: A sequence bind over something that is not a sequence.
pub const BIND_NOT_SEQ: Code = Code::error(
  3057,
  "Bind expression is not a sequence",
  "the bind expression",
  &["primary: bind source"],
  &[],
);

/// 3058: Type arguments given to a function without type parameters, or the
/// wrong number of them.
pub const INSTANTIATION: Code = Code::error(
  3058,
  "Wrong number of type parameters",
  "the instantiation",
  &["primary: instantiation"],
  &[],
);

/// 3059: `new C(...)` with no constructor matching the arguments.
///
/// - Details: `Args`.
pub const NO_CONSTRUCTOR: Code = Code::error(
  3059,
  "No matching constructor",
  "the new expression",
  &["primary: new expression"],
  &[],
);

/// 3060: A constructor called other than through `new` or from another
/// constructor.
pub const CONSTRUCTOR_CALL: Code = Code::error(
  3060,
  "Constructor can only be called from new or another constructor",
  "the call",
  &["primary: call"],
  &[],
);

/// 3061: A history counter over a name that is not an operation.
pub const HISTORY_NOT_OPERATION: Code = Code::error(
  3061,
  "History expression must name an operation",
  "the history expression",
  &["primary: expression"],
  &[],
);

/// 3062: `pre_(f, ...)` where `f` is not a function.
pub const PRE_NOT_FUNCTION: Code = Code::error(
  3062,
  "pre_ must apply to a function",
  "the function operand",
  &["primary: operand"],
  &[],
);

/// 3063: A value not compatible with its declared type.
///
/// - Details: `Expected`, `Actual`.
pub const VALUE_TYPE: Code = Code::error(
  3063,
  "Value does not match declared type",
  "the value expression",
  &["primary: value"],
  &[],
);

/// 3064: Equality over a union whose members define equality differently.
pub const AMBIGUOUS_EQUALITY: Code = Code::error(
  3064,
  "Ambiguous equality definition",
  "the comparison",
  &["primary: comparison"],
  &[],
);

/// 3065: A function body of the wrong type.
///
/// - Details: `Expected`, `Actual`.
pub const FUNCTION_RESULT: Code = Code::error(
  3065,
  "Function returns unexpected type",
  "the function body",
  &["primary: body"],
  &[],
);

/// 3066: A precondition that calls its own function.
pub const RECURSIVE_PRECONDITION: Code = Code::error(
  3066,
  "Precondition cannot call its own function",
  "the call inside the precondition",
  &["primary: call"],
  &[],
);

/// 3067: A value that is compatible with its target but not a subtype of it,
/// reported only under strict checking.
///
/// - Details: `Expected`, `Actual`.
pub const MAY_NOT_MATCH: Code = Code::error(
  3067,
  "Value may not be of expected type",
  "the value",
  &["primary: value"],
  &[],
);

// Statements.

/// 3080: An assignment whose value does not fit the target.
///
/// - Details: `Expected`, `Actual`.
pub const ASSIGN_TYPE: Code = Code::error(
  3080,
  "Assignment value has wrong type",
  "the assigned value",
  &["primary: value"],
  &[],
);

/// 3081: An assignment to a name that is not state, an instance variable or a
/// `dcl` variable.
pub const NOT_ASSIGNABLE: Code = Code::error(
  3081,
  "Cannot assign to this name",
  "the assignment target",
  &["primary: target"],
  &[],
);

/// 3082: A state update inside a function or pure operation.
pub const ASSIGN_IN_FUNCTION: Code = Code::error(
  3082,
  "Cannot update state in a functional context",
  "the assignment",
  &["primary: assignment"],
  &[],
);

/// 3083: A returned value of the wrong type.
///
/// - Details: `Expected`, `Actual`.
pub const RETURN_TYPE: Code = Code::error(
  3083,
  "Return value has wrong type",
  "the return statement",
  &["primary: return"],
  &[],
);

/// 3084: `return` with no value in an operation that has a result.
pub const RETURN_VALUE_MISSING: Code = Code::error(
  3084,
  "Operation must return a value",
  "the return statement",
  &["primary: return"],
  &[],
);

/// 3085: `return e` in an operation with no result.
pub const RETURN_IN_VOID: Code = Code::error(
  3085,
  "Void operation returns a value",
  "the return statement",
  &["primary: return"],
  &[],
);

/// 3086: A call statement whose target is not an operation.
pub const CALL_NOT_OPERATION: Code = Code::error(
  3086,
  "Call target is not an operation",
  "the call",
  &["primary: call"],
  &[],
);

/// 3087: `for all` over a non-set.
pub const LOOP_NOT_SET: Code = Code::error(
  3087,
  "Loop expression is not a set",
  "the loop expression",
  &["primary: expression"],
  &[],
);

/// 3088: `for` over a non-sequence.
pub const LOOP_NOT_SEQ: Code = Code::error(
  3088,
  "Loop expression is not a sequence",
  "the loop expression",
  &["primary: expression"],
  &[],
);

/// 3089: Index loop bounds or step that are not numeric.
pub const LOOP_BOUNDS: Code = Code::error(
  3089,
  "Loop bounds must be numeric",
  "the bound expression",
  &["primary: bound"],
  &[],
);

/// 3090: `start`/`stop` of something that is not an object or set of objects.
pub const NOT_AN_OBJECT: Code = Code::error(
  3090,
  "Expression is not an object",
  "the operand",
  &["primary: operand"],
  &[],
);

/// 3092: An operation used as a value in an object call target.
pub const NOT_AN_OPERATION_FIELD: Code = Code::error(
  3092,
  "Object has no such operation",
  "the object call",
  &["primary: call"],
  &[],
);

// Definitions.

/// 3100: Measures of one recursive cycle return incompatible types.
///
/// - Primary span: the later function of the cycle.
/// - Labels: secondary at every other member.
/// - Details: `Expected`, `Actual`.
pub const MEASURE_INCOMPATIBLE: Code = Code::error(
  3100,
  "Measure incompatible with mutually recursive function",
  "the function whose measure disagrees",
  &["primary: function", "secondary: other members of the cycle"],
  &[],
);

/// 3101: A measure whose result is not a natural number or a tuple of them.
pub const MEASURE_NOT_NATURAL: Code = Code::error(
  3101,
  "Measure result type is not a nat, or a nat tuple",
  "the measure",
  &["primary: measure"],
  &[],
);

/// 3102: A named measure that does not exist or is not a function.
pub const MEASURE_UNDEFINED: Code = Code::error(
  3102,
  "Measure function not found",
  "the measure name",
  &["primary: measure"],
  &[],
);

/// 3103: A measure function whose parameters differ from its function's.
///
/// - Details: `Expected`, `Actual`.
pub const MEASURE_PARAMS: Code = Code::error(
  3103,
  "Measure parameters differ from function",
  "the measure name",
  &["primary: measure"],
  &[],
);

/// 3104: Parameter patterns that do not line up with the signature.
pub const PARAMETER_PATTERNS: Code = Code::error(
  3104,
  "Parameter patterns do not match signature",
  "the definition",
  &["primary: definition"],
  &[],
);

/// 3105: An explicit function or operation signature of the wrong kind.
pub const SIGNATURE_KIND: Code = Code::error(
  3105,
  "Signature is not a function or operation type",
  "the signature",
  &["primary: signature"],
  &[],
);

/// 3106: A constructor whose result is not its class.
pub const CONSTRUCTOR_RESULT: Code = Code::error(
  3106,
  "Constructor must return its class",
  "the constructor",
  &["primary: constructor"],
  &[],
);

/// 3107: An override whose signature is incompatible with the inherited one.
///
/// - Primary span: the overriding definition.
/// - Labels: secondary at the overridden definition.
pub const OVERRIDE_INCOMPATIBLE: Code = Code::error(
  3107,
  "Overriding member incompatible type",
  "the overriding definition",
  &["primary: override", "secondary: overridden definition"],
  &[],
);

/// 3108: An override of a different kind (function versus operation).
pub const OVERRIDE_KIND: Code = Code::error(
  3108,
  "Overriding member is of a different kind",
  "the overriding definition",
  &["primary: override", "secondary: overridden definition"],
  &[],
);

/// 3109: An override with more restrictive access.
pub const OVERRIDE_ACCESS: Code = Code::error(
  3109,
  "Overriding member has more restrictive access",
  "the overriding definition",
  &["primary: override", "secondary: overridden definition"],
  &[],
);

/// 3110: An override that differs in purity.
pub const OVERRIDE_PURITY: Code = Code::error(
  3110,
  "Overriding member purity differs",
  "the overriding definition",
  &["primary: override", "secondary: overridden definition"],
  &[],
);

/// 3111: A class that inherits from itself.
///
/// - Primary span: the class where the cycle was closed.
/// - Labels: secondary at every other class in the cycle.
/// - Details: `Cycle`.
pub const CIRCULAR_HIERARCHY: Code = Code::error(
  3111,
  "Circular class hierarchy detected",
  "the class closing the cycle",
  &["primary: class", "secondary: other classes of the cycle"],
  &[],
);

/// 3112: A superclass name that is not a class.
pub const UNDEFINED_SUPERCLASS: Code = Code::error(
  3112,
  "Undefined superclass",
  "the superclass reference",
  &["primary: superclass name"],
  &[],
);

/// 3113: Two superclasses both contribute a member with the same name.
///
/// - Primary span: the inheriting class.
/// - Labels: secondary at each contributing definition.
pub const INHERITED_AMBIGUITY: Code = Code::error(
  3113,
  "Ambiguous inherited member",
  "the inheriting class",
  &["primary: class", "secondary: each inherited candidate"],
  &[],
);

/// 3114: `per` or `mutex` naming something that is not an operation.
///
/// - Details: `Name`.
pub const SYNC_NOT_OPERATION: Code = Code::error(
  3114,
  "Synchronisation must name an operation",
  "the permission predicate or mutex",
  &["primary: sync definition"],
  &[],
);

/// 3115: An ext clause naming a name that is not state.
pub const EXTERNAL_NOT_STATE: Code = Code::error(
  3115,
  "External clause names a non-state variable",
  "the ext clause",
  &["primary: clause"],
  &[],
);

/// 3116: An async operation with a result.
pub const ASYNC_RESULT: Code = Code::error(
  3116,
  "Async operation cannot return a value",
  "the operation",
  &["primary: operation"],
  &[],
);

/// 3117: A trace that applies something other than an operation.
pub const TRACE_NOT_OPERATION: Code = Code::error(
  3117,
  "Trace must call an operation",
  "the trace apply",
  &["primary: trace apply"],
  &[],
);

/// 3118: A state `init` clause whose pattern is not an identifier or a record
/// pattern of the state type.
pub const STATE_INIT_PATTERN: Code = Code::error(
  3118,
  "State initialisation pattern must match the state record",
  "the init pattern",
  &["primary: pattern"],
  &[],
);

// Warnings.

/// 5000: A private member or local definition that is never referenced.
///
/// - Details: `Name`.
pub const UNUSED: Code = Code::warning(
  5000,
  "Definition is never used",
  "the unused definition",
  &["primary: definition"],
  &[],
);

/// 5001: A function that calls itself without a `measure`.
///
/// - Details: `Name`.
pub const NO_MEASURE: Code = Code::warning(
  5001,
  "Recursive function has no measure",
  "the recursive function",
  &["primary: function"],
  &[],
);

/// 5002: Functions calling each other with no `measure` among them.
///
/// - Primary span: the first function of the cycle in source order.
/// - Labels: secondary at every other member.
/// - Details: `Cycle` listing every member.
pub const NO_MEASURE_CYCLE: Code = Code::warning(
  5002,
  "Mutually recursive cycle has no measure",
  "the first function of the cycle",
  &["primary: function", "secondary: other members"],
  &[],
);

/// 5003: Errors past the configured limit were dropped.
pub const TOO_MANY_ERRORS: Code = Code::warning(
  5003,
  "Too many errors",
  "the first dropped error",
  &["primary: dropped error"],
  &["later errors were not recorded"],
);

/// 5004: `is_`/`narrow_` with a type the operand can never have.
///
/// - Details: `Type`, `Actual`.
pub const TYPE_TEST_NEVER: Code = Code::warning(
  5004,
  "Expression can never be of this type",
  "the type test",
  &["primary: type test"],
  &[],
);

/// 5005: An operation with a result whose body may finish without `return`.
pub const MAY_NOT_RETURN: Code = Code::warning(
  5005,
  "Operation may not return a value",
  "the operation body",
  &["primary: body"],
  &[],
);

/// 5006: A statement after one that always returns or exits.
pub const UNREACHABLE: Code = Code::warning(
  5006,
  "Statement will not be reached",
  "the first unreachable statement",
  &["primary: statement"],
  &[],
);

/// 5007: A local definition that hides another definition of the same name.
///
/// - Labels: secondary at the hidden definition.
pub const HIDES_OUTER: Code = Code::warning(
  5007,
  "Local name hides an outer definition",
  "the hiding definition",
  &["primary: local", "secondary: hidden definition"],
  &[],
);
