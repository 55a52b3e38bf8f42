//! A small to-do list in the terminal.
//!
//! Run with `cargo run --example todo`. Tab moves focus, Enter or Space
//! activates, F1 opens the help window, Escape closes it and Ctrl+C quits.

use arbor::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct Task {
    id: u32,
    title: String,
    done: bool,
}

const FILTERS: [&str; 3] = ["all", "open", "done"];

fn shown(filter: usize, task: &Task) -> bool {
    match filter {
        1 => !task.done,
        2 => task.done,
        _ => true,
    }
}

fn main() -> Result<(), GuiError> {
    let mut bindings = KeyBindingRegistry::with_defaults();
    bindings.bind(Key::F(1), Modifiers::NONE, BindingAction::Custom("help".into()));
    let config = GuiConfig::new()
        .with_title("todo")
        .with_padding(Spacing::all(1))
        .with_spacing(1)
        .with_bindings(bindings);

    let mut gui = Gui::terminal(config)?;
    while gui.begin_frame() {
        let tasks = gui.variable(|| {
            vec![Task {
                id: 0,
                title: String::from("try arbor"),
                done: false,
            }]
        });
        let next_id = gui.variable(|| 1u32);
        let draft = gui.variable(String::new);
        let filter = gui.variable(|| 0usize);
        let help = gui.variable(|| false);

        gui.styled_text("To do", &CellStyle::new().bold());

        gui.series(&SeriesConfig::horizontal().spacing(1), |gui| {
            gui.text_input(draft, &TextInputConfig::new(24).placeholder("new task"));
            if gui.button("Add") {
                let title = gui.peek(draft).trim().to_owned();
                if !title.is_empty() {
                    let id = *gui.peek(next_id);
                    gui.set(next_id, id + 1);
                    gui.update(tasks, |tasks| {
                        tasks.push(Task {
                            id,
                            title,
                            done: false,
                        })
                    });
                    gui.set(draft, String::new());
                }
            }
            gui.dropdown(filter, &FILTERS);
        });

        gui.series(&SeriesConfig::vertical().border().fill(1).scrollable(), |gui| {
            let current = gui.get(tasks).clone();
            let which = *gui.get(filter);
            let mut toggled = None;
            let mut removed = None;
            for task in current.iter().filter(|task| shown(which, task)) {
                gui.key(task.id.to_string());
                gui.series(&SeriesConfig::horizontal().spacing(1), |gui| {
                    let done = gui.variable(|| task.done);
                    if let Some(value) = gui.checkbox(&task.title, done) {
                        toggled = Some((task.id, value));
                    }
                    if gui.button("x") {
                        removed = Some(task.id);
                    }
                });
            }
            if current.is_empty() {
                gui.text("nothing to do");
            }
            if let Some((id, value)) = toggled {
                gui.update(tasks, |tasks| {
                    if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
                        task.done = value;
                    }
                });
            }
            if let Some(id) = removed {
                gui.update(tasks, |tasks| tasks.retain(|task| task.id != id));
            }
        });

        let left = gui.get(tasks).iter().filter(|task| !task.done).count();
        gui.text(&format!("{left} left"));

        if gui.triggered("help") {
            gui.set(help, true);
        }
        gui.floating(help, &FloatingConfig::new().title("Help"), |gui| {
            gui.text("Tab / Shift+Tab  move focus");
            gui.text("Enter / Space    activate");
            gui.text("Escape           close this window");
            gui.text("Ctrl+C           quit");
        });

        gui.end_frame();
    }
    Ok(())
}
