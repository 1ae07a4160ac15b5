//! Widget, layout and dashboard composition.
//!
//! Builders read a `type` key from JSON options, create the object through
//! their factory and hand it the remaining options.

use crate::components::factory::{FactoryError, FactoryResult, GenericFactory};
use serde_json::{Map, Value};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub widget_type: String,
    pub class: String,
    /// Key under which the widget was declared, when built from a dashboard.
    pub ident: Option<String>,
    pub data: Map<String, Value>,
}

impl Widget {
    pub fn new(widget_type: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            class: class.into(),
            ident: None,
            data: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub layout_type: String,
    /// Rows of column counts, e.g. `[[1], [2, 1]]` in grid terms.
    pub structure: Vec<Value>,
}

impl Layout {
    pub fn new(layout_type: impl Into<String>) -> Self {
        Self {
            layout_type: layout_type.into(),
            structure: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct Dashboard {
    pub dashboard_type: String,
    pub class: String,
    pub widgets: Vec<Widget>,
    pub layout: Option<Layout>,
    widget_builder: Rc<WidgetBuilder>,
    layout_builder: Rc<LayoutBuilder>,
}

impl Dashboard {
    pub fn new(
        dashboard_type: impl Into<String>,
        class: impl Into<String>,
        widget_builder: Rc<WidgetBuilder>,
        layout_builder: Rc<LayoutBuilder>,
    ) -> Self {
        Self {
            dashboard_type: dashboard_type.into(),
            class: class.into(),
            widgets: Vec::new(),
            layout: None,
            widget_builder,
            layout_builder,
        }
    }

    /// Builds declared `widgets` (an object keyed by widget ident) and the
    /// optional `layout`.
    pub fn set_data(&mut self, options: &Value) -> FactoryResult<()> {
        if let Some(widgets) = options.get("widgets").and_then(Value::as_object) {
            for (ident, widget_options) in widgets {
                let mut widget = self.widget_builder.build(widget_options)?;
                widget.ident = Some(ident.clone());
                self.widgets.push(widget);
            }
        }
        if let Some(layout_options) = options.get("layout") {
            self.layout = Some(self.layout_builder.build(layout_options)?);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct WidgetBuilder {
    factory: Rc<GenericFactory<Widget>>,
}

impl WidgetBuilder {
    pub fn new(factory: Rc<GenericFactory<Widget>>) -> Self {
        Self { factory }
    }

    pub fn build(&self, options: &Value) -> FactoryResult<Widget> {
        let mut widget = self.factory.create(type_of(options)?)?;
        if let Some(object) = options.as_object() {
            widget.data.extend(
                object
                    .iter()
                    .filter(|(key, _)| key.as_str() != "type")
                    .map(|(key, value)| (key.clone(), value.clone())),
            );
        }
        Ok(widget)
    }
}

#[derive(Debug)]
pub struct LayoutBuilder {
    factory: Rc<GenericFactory<Layout>>,
}

impl LayoutBuilder {
    pub fn new(factory: Rc<GenericFactory<Layout>>) -> Self {
        Self { factory }
    }

    pub fn build(&self, options: &Value) -> FactoryResult<Layout> {
        let mut layout = self.factory.create(type_of(options)?)?;
        if let Some(structure) = options.get("structure").and_then(Value::as_array) {
            layout.structure = structure.clone();
        }
        Ok(layout)
    }
}

#[derive(Debug)]
pub struct DashboardBuilder {
    factory: Rc<GenericFactory<Dashboard>>,
}

impl DashboardBuilder {
    pub fn new(factory: Rc<GenericFactory<Dashboard>>) -> Self {
        Self { factory }
    }

    pub fn build(&self, options: &Value) -> FactoryResult<Dashboard> {
        let mut dashboard = self.factory.create(type_of(options)?)?;
        dashboard.set_data(options)?;
        Ok(dashboard)
    }
}

fn type_of(options: &Value) -> FactoryResult<&str> {
    options
        .get("type")
        .and_then(Value::as_str)
        .ok_or(FactoryError::EmptyIdent)
}
