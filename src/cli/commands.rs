//! Built-in subcommand factories
//!
//! Each factory receives the shared global flags and returns one immediate
//! child of the root. The workflow engines behind these commands (deployments,
//! sync, port forwarding, ...) live outside this crate; bodies not bundled here
//! fail with a message naming the command.

use anyhow::bail;
use clap::{Arg, ArgAction};

use crate::cli::output;
use crate::cli::registry::{ActionContext, CommandNode, SubcommandFactory};
use crate::domain::{SharedFlags, VersionCheck};

/// Immediate children of the root, in registration order.
pub const BUILTIN: &[SubcommandFactory] = &[
    // resource lifecycle
    add_cmd,
    cleanup_cmd,
    connect_cmd,
    create_cmd,
    list_cmd,
    remove_cmd,
    reset_cmd,
    set_cmd,
    status_cmd,
    use_cmd,
    update_cmd,
    // workflow
    init_cmd,
    dev_cmd,
    build_cmd,
    sync_cmd,
    purge_cmd,
    upgrade_cmd,
    deploy_cmd,
    enter_cmd,
    login_cmd,
    analyze_cmd,
    logs_cmd,
    open_cmd,
    ui_cmd,
    run_cmd,
    attach_cmd,
];

/// Body for commands whose engine is not part of this build.
fn delegate(path: &'static str) -> impl Fn(&ActionContext<'_>) -> anyhow::Result<()> {
    move |ctx| {
        tracing::debug!(
            "dispatch '{}' namespace={:?} kube_context={:?}",
            path,
            ctx.namespace(),
            ctx.kube_context()
        );
        bail!("`devspace {path}` is not available in this build")
    }
}

fn verb(name: &'static str, about: &'static str, flags: &SharedFlags) -> CommandNode {
    CommandNode::new(name, about)
        .with_flags(flags)
        .action(delegate(name))
}

/// Parent without a body; `children` are (name, path, about).
fn group(
    name: &'static str,
    about: &'static str,
    flags: &SharedFlags,
    children: &[(&'static str, &'static str, &'static str)],
) -> CommandNode {
    children.iter().fold(
        CommandNode::new(name, about).with_flags(flags),
        |node, &(child, path, child_about)| {
            node.subcommand(
                CommandNode::new(child, child_about)
                    .with_flags(flags)
                    .action(delegate(path)),
            )
        },
    )
}

fn switch(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn option(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

pub fn add_cmd(flags: &SharedFlags) -> CommandNode {
    group(
        "add",
        "Change the DevSpace configuration",
        flags,
        &[
            ("deployment", "add deployment", "Add a deployment"),
            ("image", "add image", "Add an image"),
            ("port", "add port", "Add a new port forward configuration"),
            ("sync", "add sync", "Add a sync path"),
            ("provider", "add provider", "Add a cloud provider"),
        ],
    )
}

pub fn cleanup_cmd(flags: &SharedFlags) -> CommandNode {
    group(
        "cleanup",
        "Cleans up resources",
        flags,
        &[("images", "cleanup images", "Deletes all locally created images from docker")],
    )
}

pub fn connect_cmd(flags: &SharedFlags) -> CommandNode {
    group(
        "connect",
        "Connect an external cluster to devspace cloud",
        flags,
        &[("cluster", "connect cluster", "Connects an existing cluster")],
    )
}

pub fn create_cmd(flags: &SharedFlags) -> CommandNode {
    group(
        "create",
        "Create spaces in the cloud",
        flags,
        &[("space", "create space", "Create a new cloud space")],
    )
}

pub fn list_cmd(flags: &SharedFlags) -> CommandNode {
    group(
        "list",
        "Lists configuration",
        flags,
        &[
            ("deployments", "list deployments", "Lists and shows the status of all deployments"),
            ("ports", "list ports", "Lists port forwarding configurations"),
            ("sync", "list sync", "Lists sync configuration"),
            ("spaces", "list spaces", "Lists all user spaces"),
            ("providers", "list providers", "Lists all providers"),
            ("vars", "list vars", "Lists the vars in the active config"),
        ],
    )
}

pub fn remove_cmd(flags: &SharedFlags) -> CommandNode {
    group(
        "remove",
        "Changes devspace configuration",
        flags,
        &[
            ("deployment", "remove deployment", "Removes one or all deployments"),
            ("image", "remove image", "Removes one or all images"),
            ("port", "remove port", "Removes forwarded ports"),
            ("sync", "remove sync", "Remove sync paths"),
            ("space", "remove space", "Removes a cloud space"),
            ("provider", "remove provider", "Removes a cloud provider"),
        ],
    )
}

pub fn reset_cmd(flags: &SharedFlags) -> CommandNode {
    group(
        "reset",
        "Resets an cluster token",
        flags,
        &[
            ("key", "reset key", "Resets a cluster key"),
            ("vars", "reset vars", "Resets the current config vars"),
        ],
    )
}

pub fn set_cmd(flags: &SharedFlags) -> CommandNode {
    group(
        "set",
        "Make global configuration changes",
        flags,
        &[
            ("analytics", "set analytics", "Update analytics settings"),
            ("var", "set var", "Sets a variable"),
        ],
    )
}

pub fn status_cmd(flags: &SharedFlags) -> CommandNode {
    group(
        "status",
        "Show the current status",
        flags,
        &[("sync", "status sync", "Shows the sync status")],
    )
}

pub fn use_cmd(flags: &SharedFlags) -> CommandNode {
    group(
        "use",
        "Use specific config",
        flags,
        &[
            ("space", "use space", "Use an existing space for the current configuration"),
            ("provider", "use provider", "Change the default provider"),
            ("namespace", "use namespace", "Tells DevSpace which namespace to use"),
            ("context", "use context", "Tells DevSpace which kube context to use"),
        ],
    )
}

pub fn update_cmd(flags: &SharedFlags) -> CommandNode {
    group(
        "update",
        "Updates the current config",
        flags,
        &[
            ("config", "update config", "Converts the active config to the current config version"),
            ("dependencies", "update dependencies", "Updates the git repositories of the dependencies"),
        ],
    )
}

pub fn init_cmd(flags: &SharedFlags) -> CommandNode {
    verb("init", "Initializes DevSpace in the current folder", flags).configure(|cmd| {
        cmd.arg(switch("reconfigure", "Change existing configuration"))
            .arg(option("dockerfile", "Path to the Dockerfile"))
            .arg(option("context", "Context path for building the image"))
    })
}

pub fn dev_cmd(flags: &SharedFlags) -> CommandNode {
    verb("dev", "Starts the development mode", flags).configure(|cmd| {
        cmd.arg(switch("force-build", "Forces to build every image"))
            .arg(switch("force-deploy", "Forces to deploy every deployment"))
            .arg(switch("skip-push", "Skips image pushing, useful for minikube deployment"))
            .arg(switch("no-sync", "Disable file synchronization"))
            .arg(switch("no-portforwarding", "Disable port forwarding"))
            .arg(switch("no-terminal", "Disable the terminal"))
            .arg(Arg::new("command").num_args(0..).trailing_var_arg(true))
    })
}

pub fn build_cmd(flags: &SharedFlags) -> CommandNode {
    verb("build", "Builds all defined images and pushes them", flags).configure(|cmd| {
        cmd.arg(switch("force-build", "Forces to build every image"))
            .arg(switch("skip-push", "Skips image pushing"))
    })
}

pub fn sync_cmd(flags: &SharedFlags) -> CommandNode {
    verb("sync", "Starts a bi-directional sync between the target container and the local path", flags)
        .configure(|cmd| {
            cmd.arg(option("container", "Container name within pod where to sync to"))
                .arg(option("pod", "Pod to sync to"))
                .arg(option("local-path", "Local path to use (Default is current directory)"))
                .arg(option("container-path", "Container path to use (Default is working directory)"))
        })
}

pub fn purge_cmd(flags: &SharedFlags) -> CommandNode {
    verb("purge", "Delete deployed resources", flags).configure(|cmd| {
        cmd.arg(option("deployments", "The deployment to delete (comma separated)"))
    })
}

pub fn upgrade_cmd(flags: &SharedFlags) -> CommandNode {
    CommandNode::new("upgrade", "Upgrade the DevSpace CLI to the newest version")
        .with_flags(flags)
        .action(|ctx| match ctx.version_check {
            VersionCheck::UpToDate => {
                output::success("You are using the newest version of DevSpace");
                Ok(())
            }
            VersionCheck::NewerAvailable { current, latest } => bail!(
                "devspace v{latest} is available (running v{current}): download it from https://github.com/devspace-cloud/devspace/releases"
            ),
            VersionCheck::Skipped(reason) => {
                bail!("cannot determine whether a newer version exists: {reason}")
            }
        })
}

pub fn deploy_cmd(flags: &SharedFlags) -> CommandNode {
    verb("deploy", "Deploy the project", flags).configure(|cmd| {
        cmd.arg(switch("force-build", "Forces to (re-)build every image"))
            .arg(switch("force-deploy", "Forces to (re-)deploy every deployment"))
            .arg(switch("skip-push", "Skips image pushing"))
            .arg(option("deployments", "Only deploy specific deployments (comma separated)"))
    })
}

pub fn enter_cmd(flags: &SharedFlags) -> CommandNode {
    verb("enter", "Open a shell to a container", flags).configure(|cmd| {
        cmd.arg(option("container", "Container name within pod where to execute command"))
            .arg(option("pod", "Pod to open a shell to"))
            .arg(option("label-selector", "Comma separated key=value selector list"))
            .arg(switch("pick", "Select a pod"))
            .arg(Arg::new("command").num_args(0..).trailing_var_arg(true))
    })
}

pub fn login_cmd(flags: &SharedFlags) -> CommandNode {
    verb("login", "Log into DevSpace Cloud", flags)
        .configure(|cmd| cmd.arg(option("key", "Access key to use")))
}

pub fn analyze_cmd(flags: &SharedFlags) -> CommandNode {
    verb("analyze", "Analyzes a kubernetes namespace and checks for potential problems", flags)
        .configure(|cmd| cmd.arg(switch("wait", "Wait for pods to get ready if they are just starting")))
}

pub fn logs_cmd(flags: &SharedFlags) -> CommandNode {
    verb("logs", "Prints the logs of a pod and attaches to it", flags).configure(|cmd| {
        cmd.arg(option("container", "Container name within pod where to execute command"))
            .arg(option("pod", "Pod to print the logs of"))
            .arg(switch("follow", "Attach to logs afterwards").short('f'))
            .arg(option("lines", "Max amount of lines to print from the last log").default_value("200"))
    })
}

pub fn open_cmd(flags: &SharedFlags) -> CommandNode {
    verb("open", "Opens the space in the browser", flags)
}

pub fn ui_cmd(flags: &SharedFlags) -> CommandNode {
    verb("ui", "Opens the management ui in the browser", flags)
}

pub fn run_cmd(flags: &SharedFlags) -> CommandNode {
    verb("run", "Run executes a predefined command", flags).configure(|cmd| {
        cmd.arg(Arg::new("name").required(true).help("Name of the command"))
            .arg(Arg::new("args").num_args(0..).trailing_var_arg(true))
    })
}

pub fn attach_cmd(flags: &SharedFlags) -> CommandNode {
    verb("attach", "Attaches to a container", flags).configure(|cmd| {
        cmd.arg(option("container", "Container name within pod where to attach to"))
            .arg(option("pod", "Pod to attach to"))
            .arg(switch("pick", "Select a pod"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::registry::build_root_command;

    #[test]
    fn given_builtin_factories_when_building_then_names_are_unique() {
        let flags = SharedFlags::new();
        let root = build_root_command(&flags);

        let mut names: Vec<&str> = root.children().iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), BUILTIN.len());
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), BUILTIN.len());
    }

    #[test]
    fn given_builtin_tree_then_every_node_shares_flags() {
        fn check(node: &CommandNode, flags: &SharedFlags) {
            assert!(
                node.flags().expect("node holds flags").same_record(flags),
                "{} holds a different flags record",
                node.name()
            );
            node.children().iter().for_each(|c| check(c, flags));
        }

        let flags = SharedFlags::new();
        let root = build_root_command(&flags);
        check(&root, &flags);
    }

    #[test]
    fn given_builtin_tree_then_clap_definition_is_valid() {
        let flags = SharedFlags::new();
        build_root_command(&flags).to_clap().debug_assert();
    }
}
