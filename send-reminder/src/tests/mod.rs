mod send_reminder_tests;
