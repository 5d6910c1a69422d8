//! Subcommand implementations

use anyhow::{anyhow, bail, Context, Result};
use cireg_core::DescriptorRegistryClient;
use std::io::Write;

/// Deployable category listed by `types`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Category {
    Artifacts,
    Resources,
    Embedded,
}

impl Category {
    pub(crate) const NAMES: [&'static str; 3] = ["artifacts", "resources", "embedded"];

    pub(crate) fn parse(name: &str) -> Result<Self> {
        match name {
            "artifacts" => Ok(Self::Artifacts),
            "resources" => Ok(Self::Resources),
            "embedded" => Ok(Self::Embedded),
            other => bail!("unknown category '{other}'"),
        }
    }
}

pub(crate) fn types(client: &DescriptorRegistryClient, category: Category, out: &mut impl Write) -> Result<()> {
    let names = match category {
        Category::Artifacts => client.deployable_artifact_types()?,
        Category::Resources => client.deployable_resource_types()?,
        Category::Embedded => client.embedded_deployable_types()?,
    };
    write_lines(out, &names)
}

pub(crate) fn properties(
    client: &DescriptorRegistryClient,
    type_name: &str,
    all: bool,
    out: &mut impl Write,
) -> Result<()> {
    let names = if all {
        client.properties_for_type(type_name, |_| true)?
    } else {
        client.editable_properties_for_deployable_type(type_name)?
    };
    write_lines(out, &names)
}

pub(crate) fn descriptors(client: &DescriptorRegistryClient, out: &mut impl Write) -> Result<()> {
    let mut names: Vec<String> = client
        .descriptors()?
        .iter()
        .map(|descriptor| descriptor.ty().name().to_string())
        .collect();
    names.sort_unstable();
    write_lines(out, &names)
}

pub(crate) fn build(
    client: &DescriptorRegistryClient,
    type_name: &str,
    id: &str,
    assignments: &[String],
    embeds: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let mut item = client.new_instance(type_name, id)?;

    for assignment in assignments {
        let (name, value) = split_pair(assignment, '=')?;
        client
            .set_property_value(&mut item, name, Some(value))
            .with_context(|| format!("setting '{name}'"))?;
    }

    for embed in embeds {
        let (child_type, child_id) = split_pair(embed, ':')?;
        let child = client.new_instance(child_type, child_id)?;
        client.add_embedded(&mut item, child)?;
    }

    serde_json::to_writer_pretty(&mut *out, &item)?;
    writeln!(out)?;
    Ok(())
}

fn split_pair(raw: &str, separator: char) -> Result<(&str, &str)> {
    raw.split_once(separator)
        .filter(|(left, _)| !left.is_empty())
        .ok_or_else(|| anyhow!("expected '<name>{separator}<value>', got '{raw}'"))
}

fn write_lines(out: &mut impl Write, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
