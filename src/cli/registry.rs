//! Command registry: the tree of named subcommands under the root
//!
//! The tree is assembled once per process from subcommand factories, each of
//! which receives the same `SharedFlags` handle.

use clap::{ArgMatches, Args, Command};

use crate::cli::args::GlobalArgs;
use crate::cli::commands;
use crate::config::Settings;
use crate::domain::{SharedFlags, VersionCheck};

/// Everything a command body gets to see.
pub struct ActionContext<'a> {
    /// Global flags (the same record every node holds)
    pub flags: &'a SharedFlags,
    /// Resolved configuration (file layer plus environment)
    pub settings: &'a Settings,
    /// Matches of the selected command
    pub matches: &'a ArgMatches,
    /// Result of this run's freshness check
    pub version_check: &'a VersionCheck,
}

impl ActionContext<'_> {
    /// `--namespace`, falling back to the configured default.
    pub fn namespace(&self) -> Option<String> {
        self.flags
            .get()
            .namespace
            .clone()
            .or_else(|| self.settings.namespace.clone())
    }

    /// `--kube-context`, falling back to the configured default.
    pub fn kube_context(&self) -> Option<String> {
        self.flags
            .get()
            .kube_context
            .clone()
            .or_else(|| self.settings.kube_context.clone())
    }
}

/// Body of a command.
pub type Action = Box<dyn Fn(&ActionContext<'_>) -> anyhow::Result<()>>;

/// Factory producing one immediate child of the root.
pub type SubcommandFactory = fn(&SharedFlags) -> CommandNode;

/// A named unit of behavior with optional body and children.
pub struct CommandNode {
    command: Command,
    action: Option<Action>,
    children: Vec<CommandNode>,
    flags: Option<SharedFlags>,
}

impl std::fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name())
            .field("has_action", &self.action.is_some())
            .field("children", &self.children)
            .finish()
    }
}

impl CommandNode {
    pub fn new(name: &'static str, about: &'static str) -> Self {
        Self {
            command: Command::new(name).about(about),
            action: None,
            children: Vec::new(),
            flags: None,
        }
    }

    /// Adjust the underlying clap command (args, long help, aliases).
    pub fn configure(mut self, f: impl FnOnce(Command) -> Command) -> Self {
        self.command = f(self.command);
        self
    }

    /// Keep the shared global flags handle.
    pub fn with_flags(mut self, flags: &SharedFlags) -> Self {
        self.flags = Some(flags.clone());
        self
    }

    pub fn action(
        mut self,
        action: impl Fn(&ActionContext<'_>) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    /// Attach a child. Sibling names must be unique.
    pub fn subcommand(mut self, child: CommandNode) -> Self {
        assert!(
            self.find(child.name()).is_none(),
            "duplicate subcommand '{}' under '{}'",
            child.name(),
            self.name()
        );
        self.children.push(child);
        self
    }

    /// Set the version reported by `--version`. Empty means no version flag.
    pub fn set_version(&mut self, version: &str) {
        if !version.is_empty() {
            self.command = self.command.clone().version(version.to_string());
        }
    }

    pub fn name(&self) -> &str {
        self.command.get_name()
    }

    pub fn children(&self) -> &[CommandNode] {
        &self.children
    }

    pub fn find(&self, name: &str) -> Option<&CommandNode> {
        self.children.iter().find(|c| c.name() == name)
    }

    pub fn flags(&self) -> Option<&SharedFlags> {
        self.flags.as_ref()
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Run the body; nodes without one succeed without doing anything.
    pub fn run(&self, ctx: &ActionContext<'_>) -> anyhow::Result<()> {
        match &self.action {
            Some(action) => action(ctx),
            None => Ok(()),
        }
    }

    /// Assemble the clap command for this node and its descendants.
    pub fn to_clap(&self) -> Command {
        let mut command = self.command.clone();
        if !self.children.is_empty() && self.action.is_none() {
            command = command
                .subcommand_required(true)
                .arg_required_else_help(true);
        }
        self.children
            .iter()
            .fold(command, |cmd, child| cmd.subcommand(child.to_clap()))
    }

    /// Follow the matched subcommands down the tree.
    ///
    /// Returns the selected node, its matches and the names on the way.
    pub fn resolve<'n, 'm>(
        &'n self,
        matches: &'m ArgMatches,
    ) -> (&'n CommandNode, &'m ArgMatches, Vec<String>) {
        let mut node = self;
        let mut matches = matches;
        let mut path = vec![self.name().to_string()];

        while let Some((name, sub_matches)) = matches.subcommand() {
            match node.find(name) {
                Some(child) => {
                    node = child;
                    matches = sub_matches;
                    path.push(name.to_string());
                }
                None => break,
            }
        }
        (node, matches, path)
    }
}

const ROOT_ABOUT: &str = "Welcome to the DevSpace!";

const ROOT_LONG_ABOUT: &str = "DevSpace accelerates developing, deploying and debugging applications with Docker and Kubernetes. Get started by running the init command in one of your projects:

    devspace init";

/// Build the root command with all built-in subcommands.
pub fn build_root_command(flags: &SharedFlags) -> CommandNode {
    build_root_with(flags, commands::BUILTIN.iter().copied())
}

/// Build the root command from the given factories, in order.
pub fn build_root_with<F>(flags: &SharedFlags, factories: impl IntoIterator<Item = F>) -> CommandNode
where
    F: FnOnce(&SharedFlags) -> CommandNode,
{
    let root = CommandNode::new("devspace", ROOT_ABOUT)
        .configure(|cmd| GlobalArgs::augment_args(cmd.long_about(ROOT_LONG_ABOUT)))
        .with_flags(flags);

    factories
        .into_iter()
        .fold(root, |root, factory| root.subcommand(factory(flags)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &'static str) -> impl FnOnce(&SharedFlags) -> CommandNode {
        move |flags| CommandNode::new(name, "test command").with_flags(flags)
    }

    #[test]
    fn given_name_list_when_building_root_then_one_child_per_name() {
        let flags = SharedFlags::new();
        let names = ["alpha", "beta", "gamma"];

        let root = build_root_with(&flags, names.map(leaf));

        let children: Vec<&str> = root.children().iter().map(|c| c.name()).collect();
        assert_eq!(children, names);
        for child in root.children() {
            assert!(child.flags().expect("flags").same_record(&flags));
        }
    }

    #[test]
    #[should_panic(expected = "duplicate subcommand 'alpha'")]
    fn given_duplicate_names_when_building_root_then_panics() {
        let flags = SharedFlags::new();
        build_root_with(&flags, ["alpha", "alpha"].map(leaf));
    }

    #[test]
    fn given_nested_args_when_resolving_then_selects_leaf() {
        let flags = SharedFlags::new();
        let root = build_root_with(&flags, [|f: &SharedFlags| {
            CommandNode::new("add", "add things")
                .with_flags(f)
                .subcommand(CommandNode::new("port", "add a port").with_flags(f))
        }]);

        let matches = root
            .to_clap()
            .try_get_matches_from(["devspace", "add", "port"])
            .unwrap();
        let (node, _, path) = root.resolve(&matches);

        assert_eq!(node.name(), "port");
        assert_eq!(path, vec!["devspace", "add", "port"]);
    }

    #[test]
    fn given_empty_version_when_set_then_no_version_flag() {
        let flags = SharedFlags::new();
        let mut root = build_root_with(&flags, Vec::<SubcommandFactory>::new());
        root.set_version("");

        let result = root.to_clap().try_get_matches_from(["devspace", "--version"]);
        assert!(result.is_err());
        assert_ne!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayVersion
        );
    }

    #[test]
    fn given_version_when_set_then_version_flag_reports_it() {
        let flags = SharedFlags::new();
        let mut root = build_root_with(&flags, Vec::<SubcommandFactory>::new());
        root.set_version("4.1.0");

        let err = root
            .to_clap()
            .try_get_matches_from(["devspace", "--version"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
