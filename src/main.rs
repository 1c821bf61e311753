use anyhow::Result;
use clap::{Parser, Subcommand};
use kit::areas::repository::Repository;

#[derive(Parser)]
#[command(
    name = "kit",
    version = "0.1.0",
    about = "A minimal local version-control system",
    long_about = "kit is a minimal local version-control system: a content-addressable \
    object store, branches, a staging index, and a three-way merge. Remotes are \
    other local directories; there is no network transport.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository in the current directory"
    )]
    Init,
    #[command(name = "add", about = "Stage a file's current contents for commit")]
    Add {
        #[arg(index = 1, help = "The file to stage")]
        path: String,
    },
    #[command(
        name = "rm",
        about = "Unstage a file and mark it for removal in the next commit"
    )]
    Rm {
        #[arg(index = 1, help = "The file to remove")]
        path: String,
    },
    #[command(name = "commit", about = "Record the staged snapshot as a new commit")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(
        name = "checkout",
        about = "Switch branches or restore a file from a commit",
        long_about = "Three forms are accepted:\n  \
        kit checkout <branch>            switch to a branch\n  \
        kit checkout -- <path>           restore a file from the head commit\n  \
        kit checkout <commit> -- <path>  restore a file from a commit (prefix ok)"
    )]
    Checkout {
        #[arg(index = 1, help = "Branch name or commit hash prefix")]
        target: Option<String>,
        #[arg(index = 2, last = true, help = "The file to restore")]
        path: Option<String>,
    },
    #[command(name = "branch", about = "Create a new branch at the current commit")]
    Branch {
        #[arg(index = 1, help = "The branch name")]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch pointer")]
    RmBranch {
        #[arg(index = 1, help = "The branch name")]
        name: String,
    },
    #[command(name = "log", about = "Show the current branch's commit history")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever made")]
    GlobalLog,
    #[command(name = "find", about = "Print the ids of commits with a given message")]
    Find {
        #[arg(index = 1, help = "The commit message to search for")]
        message: String,
    },
    #[command(
        name = "status",
        about = "Show branches, staged files, and files staged for removal"
    )]
    Status,
    #[command(name = "merge", about = "Merge a branch into the current branch")]
    Merge {
        #[arg(index = 1, help = "The branch to merge in")]
        branch: String,
    },
    #[command(name = "add-remote", about = "Register a local directory as a remote")]
    AddRemote {
        #[arg(index = 1, help = "The remote name")]
        name: String,
        #[arg(index = 2, help = "Path to the remote repository directory")]
        directory: String,
    },
    #[command(name = "rm-remote", about = "Unregister a remote")]
    RmRemote {
        #[arg(index = 1, help = "The remote name")]
        name: String,
    },
    #[command(
        name = "fetch",
        about = "Copy a remote branch's history into this repository"
    )]
    Fetch {
        #[arg(index = 1, help = "The remote name")]
        remote: String,
        #[arg(index = 2, help = "The branch to fetch")]
        branch: String,
    },
    #[command(name = "push", about = "Append local history onto a remote branch")]
    Push {
        #[arg(index = 1, help = "The remote name")]
        remote: String,
        #[arg(index = 2, help = "The branch to push")]
        branch: String,
    },
    #[command(name = "pull", about = "Fetch a remote branch and merge it")]
    Pull {
        #[arg(index = 1, help = "The remote name")]
        remote: String,
        #[arg(index = 2, help = "The branch to pull")]
        branch: String,
    },
}

fn main() {
    // Expected failures print a single message; the process never panics on them.
    if let Err(error) = run() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let pwd = std::env::current_dir()?;

    if let Commands::Init = cli.command {
        let repository = Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))?;
        repository.init()?;
        return repository.flush();
    }

    let repository = Repository::open(&pwd.to_string_lossy(), Box::new(std::io::stdout()))?;

    match &cli.command {
        Commands::Init => unreachable!("handled above"),
        Commands::Add { path } => repository.add(path)?,
        Commands::Rm { path } => repository.rm(path)?,
        Commands::Commit { message } => repository.commit(message)?,
        Commands::Checkout { target, path } => {
            repository.checkout(target.as_deref(), path.as_deref())?
        }
        Commands::Branch { name } => repository.branch(name)?,
        Commands::RmBranch { name } => repository.rm_branch(name)?,
        Commands::Log => repository.log()?,
        Commands::GlobalLog => repository.global_log()?,
        Commands::Find { message } => repository.find(message)?,
        Commands::Status => repository.status()?,
        Commands::Merge { branch } => repository.merge(branch)?,
        Commands::AddRemote { name, directory } => repository.add_remote(name, directory)?,
        Commands::RmRemote { name } => repository.rm_remote(name)?,
        Commands::Fetch { remote, branch } => repository.fetch(remote, branch)?,
        Commands::Push { remote, branch } => repository.push(remote, branch)?,
        Commands::Pull { remote, branch } => repository.pull(remote, branch)?,
    }

    repository.flush()
}
