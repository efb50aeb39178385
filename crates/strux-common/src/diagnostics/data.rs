use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const COULD_NOT_FIND_SYMBOL: u32 = 2304;
    pub const TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE: u32 = 2310;
    pub const GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS: u32 = 2314;
    pub const TYPE_IS_NOT_GENERIC: u32 = 2315;
    pub const CANNOT_CONVERT: u32 = 2322;
    pub const PROPERTY_IS_MISSING_IN_TYPE: u32 = 2324;
    pub const PROPERTY_PRIVATE_IN_ONE_PUBLIC_IN_OTHER: u32 = 2325;
    pub const TYPES_OF_PROPERTY_ARE_INCOMPATIBLE: u32 = 2326;
    pub const TYPES_DEFINE_PROPERTY_AS_PRIVATE: u32 = 2327;
    pub const PROPERTY_OPTIONAL_IN_SOURCE_REQUIRED_IN_TARGET: u32 = 2328;
    pub const TYPE_LACKS_CALL_SIGNATURE: u32 = 2329;
    pub const CALL_SIGNATURES_ARE_INCOMPATIBLE: u32 = 2330;
    pub const CONSTRUCT_SIGNATURES_ARE_INCOMPATIBLE: u32 = 2331;
    pub const INDEX_SIGNATURES_ARE_INCOMPATIBLE: u32 = 2332;
    pub const CALL_SIGNATURE_EXPECTS_FEWER_PARAMETERS: u32 = 2333;
    pub const TYPES_OF_PARAMETERS_ARE_INCOMPATIBLE: u32 = 2334;
    pub const RETURN_TYPES_ARE_INCOMPATIBLE: u32 = 2335;
    pub const TYPE_LACKS_CONSTRUCT_SIGNATURE: u32 = 2336;
    pub const TYPE_LACKS_INDEX_SIGNATURE: u32 = 2337;
    pub const SIGNATURE_SHAPES_DIFFER: u32 = 2338;
    pub const PROPERTY_DOES_NOT_EXIST_ON_VALUE: u32 = 2339;
    pub const TYPE_DOES_NOT_SATISFY_THE_CONSTRAINT: u32 = 2344;
    pub const SUPPLIED_PARAMETERS_DO_NOT_MATCH_ANY_SIGNATURE: u32 = 2346;
    pub const CANNOT_INVOKE_EXPRESSION_LACKING_CALL_SIGNATURE: u32 = 2349;
    pub const AMBIGUOUS_GENERIC_CALL: u32 = 2350;
    pub const CANNOT_NEW_EXPRESSION_LACKING_CONSTRUCT_SIGNATURE: u32 = 2351;
    pub const VALUE_IS_NOT_INDEXABLE: u32 = 2352;
    pub const CLASS_INCORRECTLY_EXTENDS_BASE_CLASS: u32 = 2415;
    pub const CLASS_INCORRECTLY_IMPLEMENTS_INTERFACE: u32 = 2420;
    pub const INTERFACE_INCORRECTLY_EXTENDS_INTERFACE: u32 = 2430;
    pub const EXPECTED_TYPE_ARGUMENTS: u32 = 2558;
    pub const TYPE_IS_NOT_ASSIGNABLE: u32 = 2559;
}

pub mod diagnostic_messages {
    pub const COULD_NOT_FIND_SYMBOL: &str = "Could not find symbol '{0}'.";
    pub const TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE: &str =
        "Type '{0}' recursively references itself as a base type.";
    pub const GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS: &str =
        "Generic type '{0}' requires {1} type argument(s).";
    pub const TYPE_IS_NOT_GENERIC: &str = "Type '{0}' is not generic.";
    pub const CANNOT_CONVERT: &str = "Cannot convert '{0}' to '{1}'.";
    pub const PROPERTY_IS_MISSING_IN_TYPE: &str = "Type '{0}' is missing property '{1}' from type '{2}'.";
    pub const PROPERTY_PRIVATE_IN_ONE_PUBLIC_IN_OTHER: &str =
        "Property '{0}' defined as private in type '{1}' is defined as public in type '{2}'.";
    pub const TYPES_OF_PROPERTY_ARE_INCOMPATIBLE: &str =
        "Types of property '{0}' of types '{1}' and '{2}' are incompatible:";
    pub const TYPES_DEFINE_PROPERTY_AS_PRIVATE: &str =
        "Types '{0}' and '{1}' define property '{2}' as private.";
    pub const PROPERTY_OPTIONAL_IN_SOURCE_REQUIRED_IN_TARGET: &str =
        "Property '{0}' defined as optional in type '{1}', but is required in type '{2}'.";
    pub const TYPE_LACKS_CALL_SIGNATURE: &str =
        "Type '{0}' requires a call signature, but type '{1}' lacks one.";
    pub const CALL_SIGNATURES_ARE_INCOMPATIBLE: &str =
        "Call signatures of types '{0}' and '{1}' are incompatible:";
    pub const CONSTRUCT_SIGNATURES_ARE_INCOMPATIBLE: &str =
        "Construct signatures of types '{0}' and '{1}' are incompatible:";
    pub const INDEX_SIGNATURES_ARE_INCOMPATIBLE: &str =
        "Index signatures of types '{0}' and '{1}' are incompatible:";
    pub const CALL_SIGNATURE_EXPECTS_FEWER_PARAMETERS: &str =
        "Call signature expects {0} or fewer parameters.";
    pub const TYPES_OF_PARAMETERS_ARE_INCOMPATIBLE: &str =
        "Types of parameters '{0}' and '{1}' of types '{2}' and '{3}' are incompatible:";
    pub const RETURN_TYPES_ARE_INCOMPATIBLE: &str =
        "Return types of call signatures '{0}' and '{1}' are incompatible:";
    pub const TYPE_LACKS_CONSTRUCT_SIGNATURE: &str =
        "Type '{0}' requires a construct signature, but type '{1}' lacks one.";
    pub const TYPE_LACKS_INDEX_SIGNATURE: &str =
        "Type '{0}' requires an index signature, but type '{1}' lacks one.";
    pub const SIGNATURE_SHAPES_DIFFER: &str =
        "Signatures '{0}' and '{1}' differ in type parameter or parameter counts.";
    pub const PROPERTY_DOES_NOT_EXIST_ON_VALUE: &str =
        "The property '{0}' does not exist on value of type '{1}'.";
    pub const TYPE_DOES_NOT_SATISFY_THE_CONSTRAINT: &str =
        "Type '{0}' does not satisfy the constraint '{1}' for type parameter '{2}'.";
    pub const SUPPLIED_PARAMETERS_DO_NOT_MATCH_ANY_SIGNATURE: &str =
        "Supplied parameters do not match any signature of call target.";
    pub const CANNOT_INVOKE_EXPRESSION_LACKING_CALL_SIGNATURE: &str =
        "Cannot invoke an expression whose type lacks a call signature.";
    pub const AMBIGUOUS_GENERIC_CALL: &str =
        "Could not select overload for call expression: candidate return types '{0}' and '{1}' have no common type.";
    pub const CANNOT_NEW_EXPRESSION_LACKING_CONSTRUCT_SIGNATURE: &str =
        "Cannot use 'new' with an expression whose type lacks a construct signature.";
    pub const VALUE_IS_NOT_INDEXABLE: &str = "Value of type '{0}' is not indexable by type '{1}'.";
    pub const CLASS_INCORRECTLY_EXTENDS_BASE_CLASS: &str =
        "Class '{0}' cannot extend class '{1}':";
    pub const CLASS_INCORRECTLY_IMPLEMENTS_INTERFACE: &str =
        "Class '{0}' declares interface '{1}' but does not implement it:";
    pub const INTERFACE_INCORRECTLY_EXTENDS_INTERFACE: &str =
        "Interface '{0}' cannot extend interface '{1}':";
    pub const EXPECTED_TYPE_ARGUMENTS: &str = "Expected {0} type arguments, but got {1}.";
    pub const TYPE_IS_NOT_ASSIGNABLE: &str = "Type '{0}' is not assignable to type '{1}'.";
}

macro_rules! message {
    ($name:ident, $category:ident) => {
        DiagnosticMessage {
            code: diagnostic_codes::$name,
            category: DiagnosticCategory::$category,
            message: diagnostic_messages::$name,
        }
    };
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    message!(COULD_NOT_FIND_SYMBOL, Error),
    message!(TYPE_RECURSIVELY_REFERENCES_ITSELF_AS_A_BASE_TYPE, Error),
    message!(GENERIC_TYPE_REQUIRES_TYPE_ARGUMENTS, Error),
    message!(TYPE_IS_NOT_GENERIC, Error),
    message!(CANNOT_CONVERT, Error),
    message!(PROPERTY_IS_MISSING_IN_TYPE, Message),
    message!(PROPERTY_PRIVATE_IN_ONE_PUBLIC_IN_OTHER, Message),
    message!(TYPES_OF_PROPERTY_ARE_INCOMPATIBLE, Message),
    message!(TYPES_DEFINE_PROPERTY_AS_PRIVATE, Message),
    message!(PROPERTY_OPTIONAL_IN_SOURCE_REQUIRED_IN_TARGET, Message),
    message!(TYPE_LACKS_CALL_SIGNATURE, Message),
    message!(CALL_SIGNATURES_ARE_INCOMPATIBLE, Message),
    message!(CONSTRUCT_SIGNATURES_ARE_INCOMPATIBLE, Message),
    message!(INDEX_SIGNATURES_ARE_INCOMPATIBLE, Message),
    message!(CALL_SIGNATURE_EXPECTS_FEWER_PARAMETERS, Message),
    message!(TYPES_OF_PARAMETERS_ARE_INCOMPATIBLE, Message),
    message!(RETURN_TYPES_ARE_INCOMPATIBLE, Message),
    message!(TYPE_LACKS_CONSTRUCT_SIGNATURE, Message),
    message!(TYPE_LACKS_INDEX_SIGNATURE, Message),
    message!(SIGNATURE_SHAPES_DIFFER, Message),
    message!(PROPERTY_DOES_NOT_EXIST_ON_VALUE, Error),
    message!(TYPE_DOES_NOT_SATISFY_THE_CONSTRAINT, Error),
    message!(SUPPLIED_PARAMETERS_DO_NOT_MATCH_ANY_SIGNATURE, Error),
    message!(CANNOT_INVOKE_EXPRESSION_LACKING_CALL_SIGNATURE, Error),
    message!(AMBIGUOUS_GENERIC_CALL, Error),
    message!(CANNOT_NEW_EXPRESSION_LACKING_CONSTRUCT_SIGNATURE, Error),
    message!(VALUE_IS_NOT_INDEXABLE, Error),
    message!(CLASS_INCORRECTLY_EXTENDS_BASE_CLASS, Error),
    message!(CLASS_INCORRECTLY_IMPLEMENTS_INTERFACE, Error),
    message!(INTERFACE_INCORRECTLY_EXTENDS_INTERFACE, Error),
    message!(EXPECTED_TYPE_ARGUMENTS, Error),
    message!(TYPE_IS_NOT_ASSIGNABLE, Message),
];
