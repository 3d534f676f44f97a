//! Built-in Vue single-file-component engine.
//!
//! Output is composed from format strings rather than an external
//! template file. Every artifact carries two safe regions, one in
//! the template block (markup-comment markers) and one in the script
//! block (code-comment markers), so developer edits survive
//! regeneration.

use std::fmt::Write;

use uiforge_core::{
    Action, ComponentDescriptor, ComponentKind, Direction, EntryOptions, FieldOptions,
    TableOptions, UiFramework, WidgetKind,
};

use crate::engine::{GenerateError, TemplateEngine};

/// Renders `ComponentKind::Table` and `ComponentKind::Entry` for Vue.
pub struct VueEngine;

impl TemplateEngine for VueEngine {
    fn supports(&self, framework: UiFramework, _kind: &ComponentKind) -> bool {
        framework == UiFramework::Vue
    }

    fn render(&self, descriptor: &ComponentDescriptor) -> Result<String, GenerateError> {
        Ok(match &descriptor.kind {
            ComponentKind::Table(options) => render_table(descriptor, options),
            ComponentKind::Entry(options) => render_entry(descriptor, options),
        })
    }
}

/// Rewrite `{field}` placeholders into per-item template literal
/// interpolations.
fn interpolate_item(url: &str) -> String {
    url.replace('{', "${item.")
}

fn roles_json(roles: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let quoted: Vec<String> = roles
        .into_iter()
        .map(|r| format!("\"{}\"", r.as_ref()))
        .collect();
    format!("[{}]", quoted.join(", "))
}

/// Turn a display name into a JS method identifier ("Mark paid" ->
/// "markPaid").
fn method_name(display_name: &str) -> String {
    let mut out = String::new();
    for word in display_name.split(|c: char| !c.is_alphanumeric()) {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        if out.is_empty() {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.push_str(chars.as_str());
    }
    if out.is_empty() {
        out.push_str("action");
    }
    out
}

fn input_markup(descriptor: &ComponentDescriptor, field: &FieldOptions, binding: &str) -> String {
    let name = &field.field_name;
    let widget = descriptor
        .widgets
        .get(name)
        .copied()
        .unwrap_or(WidgetKind::Text);
    match widget {
        WidgetKind::Select => {
            let options = descriptor
                .choices
                .get(name)
                .map(|choices| {
                    choices
                        .iter()
                        .map(|c| format!("          <option value=\"{c}\">{c}</option>\n"))
                        .collect::<String>()
                })
                .unwrap_or_default();
            format!(
                "        <select v-model=\"{binding}.{name}\">\n{options}        </select>\n"
            )
        }
        WidgetKind::Textarea => {
            format!("        <textarea v-model=\"{binding}.{name}\"></textarea>\n")
        }
        WidgetKind::Checkbox => {
            format!("        <input type=\"checkbox\" v-model=\"{binding}.{name}\" />\n")
        }
        other => format!(
            "        <input type=\"{}\" v-model=\"{binding}.{name}\" />\n",
            other.as_input_type()
        ),
    }
}

fn field_cell(field: &FieldOptions) -> String {
    let name = &field.field_name;
    let mut cell = String::new();
    match &field.link {
        Some(link) => {
            let href = interpolate_item(link);
            let _ = write!(
                cell,
                "          <td><a :href=\"`{href}`\">{{{{ item.{name} }}}}</a></td>\n"
            );
        }
        None => {
            let _ = write!(cell, "          <td>{{{{ item.{name} }}}}</td>\n");
        }
    }
    for custom in &field.custom_components {
        let _ = write!(
            cell,
            "          <td><{} :{}=\"item.{name}\" /></td>\n",
            custom.component_name, custom.prop_name
        );
    }
    cell
}

fn action_methods(descriptor: &ComponentDescriptor) -> String {
    let mut out = String::new();
    for action_options in &descriptor.actions {
        let name = method_name(&action_options.display_name);
        let roles = roles_json(&action_options.roles);
        let _ = write!(out, "    {name}(item) {{\n");
        let _ = write!(out, "      if (!this.hasRole({roles})) return;\n");
        for action in &action_options.actions {
            match action {
                Action::IterateChoice { field, direction } => {
                    let choices = descriptor
                        .choices
                        .get(field)
                        .map(|c| roles_json(c))
                        .unwrap_or_else(|| "[]".to_string());
                    let dir = match direction {
                        Direction::Forward => "1",
                        Direction::Backward => "-1",
                    };
                    let _ = write!(
                        out,
                        "      item.{field} = this.nextChoice(item.{field}, {choices}, {dir});\n"
                    );
                }
                Action::ToggleBoolean { field } => {
                    let _ = write!(out, "      item.{field} = !item.{field};\n");
                }
                Action::OpenUrl { url, new_tab } => {
                    let target = if *new_tab { "_blank" } else { "_self" };
                    let _ = write!(
                        out,
                        "      window.open(`{}`, \"{target}\");\n",
                        interpolate_item(url)
                    );
                }
                Action::SetCurrentDate { field } => {
                    let _ = write!(out, "      item.{field} = new Date().toISOString();\n");
                }
            }
        }
        out.push_str("      this.saveItem(item);\n");
        out.push_str("    },\n");
    }
    out
}

fn action_buttons(descriptor: &ComponentDescriptor) -> String {
    let mut out = String::new();
    for action_options in &descriptor.actions {
        let name = method_name(&action_options.display_name);
        let roles = roles_json(&action_options.roles);
        let _ = write!(
            out,
            "            <button v-if=\"hasRole({roles})\" @click=\"{name}(item)\">{}</button>\n",
            action_options.display_name
        );
    }
    out
}

const SCRIPT_HELPERS: &str = r#"    hasRole(allowed) {
      return this.roles.some((role) => allowed.includes(role));
    },
    nextChoice(current, choices, step) {
      if (choices.length === 0) return current;
      const index = choices.indexOf(current);
      return choices[(index + step + choices.length) % choices.length];
    },
"#;

fn style_block(class_name: &str) -> String {
    format!(
        r#"
<style scoped>
.{class_name} table {{
  width: 100%;
  border-collapse: collapse;
}}
.{class_name} th,
.{class_name} td {{
  padding: 0.5rem;
  border-bottom: 1px solid #ddd;
  text-align: left;
}}
.{class_name} .sortable {{
  cursor: pointer;
}}
</style>
"#
    )
}

fn render_table(descriptor: &ComponentDescriptor, options: &TableOptions) -> String {
    let component = &descriptor.name;
    let collection = descriptor.model.collection_name();
    let class_name = component.to_lowercase();

    let mut headers = String::new();
    for field in &descriptor.fields {
        if field.sortable {
            let _ = write!(
                headers,
                "            <th class=\"sortable\" @click=\"sortBy('{}')\">{}</th>\n",
                field.field_name,
                field.label()
            );
        } else {
            let _ = write!(headers, "            <th>{}</th>\n", field.label());
        }
    }

    let mut cells = String::new();
    for field in &descriptor.fields {
        cells.push_str(&field_cell(field));
    }

    let mut draft_inputs = String::new();
    for field in &descriptor.fields {
        if field.auto_generated {
            continue;
        }
        draft_inputs.push_str(&input_markup(descriptor, field, "draft"));
    }

    let fields_param = descriptor
        .fields
        .iter()
        .map(|f| f.field_name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let addable = roles_json(&options.addable_by_roles);
    let removable = roles_json(&options.removable_by_roles);
    let page_size = options.max_items_per_page;
    let buttons = action_buttons(descriptor);
    let methods = action_methods(descriptor);

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<template>
  <div class="{class_name}">
    <!-- SAFE REGION BEGIN -->
    <!-- Markup in this region is preserved across regeneration. -->
    <!-- SAFE REGION END -->
    <table>
      <thead>
        <tr>
{headers}            <th v-if="hasActions"></th>
        </tr>
      </thead>
      <tbody>
        <tr v-for="item in items" :key="item.pk">
{cells}          <td v-if="hasActions">
{buttons}            <button v-if="hasRole(removableRoles)" @click="removeItem(item)">Remove</button>
          </td>
        </tr>
      </tbody>
    </table>
    <form v-if="hasRole(addableRoles)" @submit.prevent="addItem">
{draft_inputs}      <button type="submit">Add</button>
    </form>
    <nav class="pagination">
      <button :disabled="page <= 1" @click="page -= 1; fetchItems()">Previous</button>
      <span>{{{{ page }}}} / {{{{ totalPages }}}}</span>
      <button :disabled="page >= totalPages" @click="page += 1; fetchItems()">Next</button>
    </nav>
  </div>
</template>

<script>
/* SAFE REGION BEGIN */
/* Code in this region is preserved across regeneration. */
/* SAFE REGION END */

export default {{
  name: "{component}",
  props: {{
    roles: {{ type: Array, default: () => [] }},
  }},
  data() {{
    return {{
      items: [],
      page: 1,
      totalPages: 1,
      totalItems: 0,
      sortField: null,
      sortDir: "asc",
      draft: {{}},
      addableRoles: {addable},
      removableRoles: {removable},
    }};
  }},
  computed: {{
    hasActions() {{
      return true;
    }},
  }},
  mounted() {{
    this.fetchItems();
  }},
  methods: {{
{helpers}    async fetchItems() {{
      const params = new URLSearchParams({{
        _fields: "{fields_param}",
        _page: this.page,
        _pageSize: {page_size},
      }});
      if (this.sortField) {{
        params.set("_sortBy", this.sortField);
        params.set("_sortDir", this.sortDir);
      }}
      const response = await fetch(`/{collection}?${{params}}`);
      const body = await response.json();
      this.items = body.items;
      this.totalPages = body.totalPages;
      this.totalItems = body.totalItems;
    }},
    sortBy(field) {{
      this.sortDir = this.sortField === field && this.sortDir === "asc" ? "desc" : "asc";
      this.sortField = field;
      this.fetchItems();
    }},
    async addItem() {{
      await fetch(`/{collection}`, {{
        method: "POST",
        headers: {{ "content-type": "application/json" }},
        body: JSON.stringify(this.draft),
      }});
      this.draft = {{}};
      this.fetchItems();
    }},
    async removeItem(item) {{
      await fetch(`/{collection}/${{item.pk}}`, {{ method: "DELETE" }});
      this.fetchItems();
    }},
    async saveItem(item) {{
      const changes = {{ ...item }};
      delete changes.pk;
      await fetch(`/{collection}/${{item.pk}}`, {{
        method: "PATCH",
        headers: {{ "content-type": "application/json" }},
        body: JSON.stringify(changes),
      }});
      this.fetchItems();
    }},
{methods}  }},
}};
</script>
"#,
        helpers = SCRIPT_HELPERS,
    );

    if descriptor.styling {
        out.push_str(&style_block(&class_name));
    }
    out
}

fn entry_inputs(descriptor: &ComponentDescriptor, binding: &str) -> String {
    let mut out = String::new();
    for field in &descriptor.fields {
        let _ = write!(
            out,
            "      <label>{}\n{}      </label>\n",
            field.label(),
            input_markup(descriptor, field, binding)
        );
        for custom in &field.custom_components {
            let _ = write!(
                out,
                "      <{} :{}=\"{binding}.{}\" />\n",
                custom.component_name, custom.prop_name, field.field_name
            );
        }
        // Related-object fields carry nested options rendered as a
        // repeated fieldset bound to the list value.
        if !field.fields.is_empty() {
            let list = format!("{binding}.{}", field.field_name);
            let _ = write!(
                out,
                "      <fieldset v-for=\"child in {list}\" :key=\"child.pk\">\n"
            );
            for nested in &field.fields {
                let _ = write!(
                    out,
                    "        <label>{}\n          <input type=\"text\" v-model=\"child.{}\" />\n        </label>\n",
                    nested.label(),
                    nested.field_name
                );
            }
            out.push_str("      </fieldset>\n");
        }
    }
    out
}

fn render_entry(descriptor: &ComponentDescriptor, options: &EntryOptions) -> String {
    let component = &descriptor.name;
    let collection = descriptor.model.collection_name();
    let class_name = component.to_lowercase();
    let inputs = entry_inputs(descriptor, "item");
    let methods = action_methods(descriptor);

    let fields_param = descriptor
        .fields
        .iter()
        .map(|f| f.field_name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let (props, data_init, mounted) = match &options.data_by_prop {
        Some(prop) => (
            format!(
                "    roles: {{ type: Array, default: () => [] }},\n    {prop}: {{ type: Object, required: true }},\n"
            ),
            format!("      item: this.{prop},\n"),
            String::new(),
        ),
        None => (
            "    roles: { type: Array, default: () => [] },\n    pk: { type: [Number, String], required: true },\n"
                .to_string(),
            "      item: {},\n".to_string(),
            format!(
                "  mounted() {{\n    this.fetchItem();\n  }},\n"
            ),
        ),
    };

    let fetch_method = if options.data_by_prop.is_none() {
        format!(
            r#"    async fetchItem() {{
      const response = await fetch(`/{collection}/${{this.pk}}?_fields={fields_param}`);
      this.item = await response.json();
    }},
"#
        )
    } else {
        String::new()
    };

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<template>
  <div class="{class_name}">
    <!-- SAFE REGION BEGIN -->
    <!-- Markup in this region is preserved across regeneration. -->
    <!-- SAFE REGION END -->
    <form @submit.prevent="saveItem(item)">
{inputs}      <button type="submit">Save</button>
    </form>
  </div>
</template>

<script>
/* SAFE REGION BEGIN */
/* Code in this region is preserved across regeneration. */
/* SAFE REGION END */

export default {{
  name: "{component}",
  props: {{
{props}  }},
  data() {{
    return {{
{data_init}    }};
  }},
{mounted}  methods: {{
{helpers}{fetch_method}    async saveItem(item) {{
      const changes = {{ ...item }};
      delete changes.pk;
      await fetch(`/{collection}/${{item.pk}}`, {{
        method: "PATCH",
        headers: {{ "content-type": "application/json" }},
        body: JSON.stringify(changes),
      }});
    }},
{methods}  }},
}};
</script>
"#,
        helpers = SCRIPT_HELPERS,
    );

    if descriptor.styling {
        out.push_str(&style_block(&class_name));
    }
    out
}
