//! Built-in unit templates

pub(super) const INSTANCE: &str = "instance";
pub(super) const ROOT: &str = "root";

pub(super) const INSTANCE_UNIT: &str = r#"/* Autogenerated file by genregistry */

#include <{{registry_header}}>
{{#each includes}}
#include <{{this}}>
{{/each}}

namespace {{namespace}} {
    using namespace {{using_namespace}};

    void register_{{identifier}}(Registry<{{kind}}>& r) {
        r.register_algorithm<{{type_expression}}>();
    }
}
"#;

pub(super) const ROOT_UNIT: &str = r#"/* Autogenerated file by genregistry */

#include <{{registry_header}}>

namespace {{namespace}} {
    using namespace {{using_namespace}};

{{#each kinds}}
    void register_{{ident}}s(Registry<{{name}}>& r);
    Registry<{{name}}> {{constant}}_REGISTRY = Registry<{{name}}>::with_all_from(register_{{ident}}s, "{{ident}}");

{{#each calls}}
    void register_{{this}}(Registry<{{../name}}>& r);
{{/each}}

    void register_{{ident}}s(Registry<{{name}}>& r) {
{{#each calls}}
        register_{{this}}(r);
{{/each}}
    } // register_{{ident}}s

{{/each}}
} // namespace
"#;
